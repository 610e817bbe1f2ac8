use crate::ownership::Owner;
use crate::paths::{DomainPaths, KeyRole};
use crate::tools::ProcessRunner;
use anyhow::{Context, Result};
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Composes the unsigned zone and drives the external signing tool.
pub struct ZoneSigner<'a> {
    runner: &'a dyn ProcessRunner,
    signzone: &'a Path,
    owner: &'a Owner,
}

impl<'a> ZoneSigner<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, signzone: &'a Path, owner: &'a Owner) -> Self {
        Self {
            runner,
            signzone,
            owner,
        }
    }

    /// Write `include_keys.zone`: the original zone plus `$INCLUDE` lines
    /// for both key files, resolved through their stable aliases.
    pub fn prepare(&self, paths: &DomainPaths) -> Result<PathBuf> {
        let original = paths.original_zone();
        let mut zone = std::fs::read_to_string(&original)
            .with_context(|| format!("failed to read {}", original.display()))?;

        zone.push_str(&format!("\n; dnssecctl for domain {}\n", paths.name()));
        for role in [KeyRole::Zsk, KeyRole::Ksk] {
            zone.push_str(&format!(
                "$INCLUDE {}\n",
                paths.dir().join(self.key_target(paths, role)?).display()
            ));
        }

        let unsigned = paths.unsigned_zone();
        std::fs::write(&unsigned, zone)
            .with_context(|| format!("failed to write {}", unsigned.display()))?;
        self.owner.apply(&unsigned);
        Ok(unsigned)
    }

    /// Sign `input` (the signed zone itself by default, for incremental
    /// re-signing) into the domain's signed zone path.
    pub fn sign(&self, paths: &DomainPaths, input: Option<&Path>) -> Result<()> {
        let signed = paths.signed_zone();
        let input = input.unwrap_or(&signed).to_path_buf();
        debug!("signing {} from {}", paths.name(), input.display());

        let args: Vec<String> = vec![
            "-A".into(),
            "-3".into(),
            salt(),
            "-N".into(),
            "INCREMENT".into(),
            "-t".into(),
            "-f".into(),
            signed.display().to_string(),
            "-o".into(),
            paths.name().to_string(),
            "-K".into(),
            paths.dir().display().to_string(),
            "-d".into(),
            paths.dir().display().to_string(),
            input.display().to_string(),
        ];

        self.runner.run(self.signzone, &args)?;
        self.owner.apply(&signed);
        Ok(())
    }

    /// Basename the stable key alias points at, e.g.
    /// `Kexample.com.+008+12345.key`.
    fn key_target(&self, paths: &DomainPaths, role: KeyRole) -> Result<PathBuf> {
        let alias = paths.key_file(role, "key");
        let target = std::fs::read_link(&alias)
            .with_context(|| format!("failed to resolve key alias {}", alias.display()))?;
        Ok(target
            .file_name()
            .map(PathBuf::from)
            .unwrap_or(target))
    }
}

/// 16 hex characters of NSEC3 salt.
fn salt() -> String {
    format!("{:016x}", rand::thread_rng().gen::<u64>())
}
