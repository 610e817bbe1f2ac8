use crate::aggregate;
use crate::config::Config;
use crate::lifecycle::LifecycleController;
use crate::ownership::Owner;
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

/// Initialize domains from unsigned zone files, then rebuild the aggregate
/// include file and reload the server if anything was initialized. The
/// summary reports successes and failures separately.
pub fn execute(config: &Config, files: Vec<PathBuf>) -> Result<()> {
    let mut controller = LifecycleController::new(config);

    let summary = controller.init_domains(&files);
    if summary.initialized > 0 {
        aggregate::rebuild(&config.base_dir, &Owner::new(&config.user, &config.group))?;
        controller.reload()?;
        println!(
            "{}",
            format!(
                "✓ {} zone(s) initialized, server reloaded",
                summary.initialized
            )
            .green()
        );
    }
    if summary.failed > 0 {
        println!("{}", format!("✗ {} zone(s) failed", summary.failed).red());
    }

    Ok(())
}
