use crate::ownership::Owner;
use crate::paths;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

/// Rebuild `named.conf.local.signed` from every domain directory that has a
/// `named.block` fragment.
///
/// The previous aggregate is overwritten unconditionally; entries appear in
/// filesystem enumeration order.
pub fn rebuild(base_dir: &Path, owner: &Owner) -> Result<()> {
    let aggregate = paths::aggregate_config(base_dir);
    let mut contents = String::new();

    let entries = std::fs::read_dir(base_dir)
        .with_context(|| format!("failed to read {}", base_dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let named_block = entry.path().join("named.block");
        if !named_block.is_file() {
            continue;
        }
        info!(
            "add named.block for {}",
            entry.file_name().to_string_lossy()
        );
        writeln!(contents, "$INCLUDE {}", named_block.display())?;
    }

    std::fs::write(&aggregate, contents)
        .with_context(|| format!("failed to write {}", aggregate.display()))?;
    owner.apply(&aggregate);
    Ok(())
}
