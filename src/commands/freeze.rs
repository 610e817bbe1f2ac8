use crate::config::Config;
use crate::lifecycle::LifecycleController;
use anyhow::Result;

/// Freeze every requested zone that has a signed zone on disk.
pub fn execute(config: &Config, zones: Vec<String>) -> Result<()> {
    let controller = LifecycleController::new(config);
    controller.for_each_signed(&zones, |zone| controller.freeze(zone));
    Ok(())
}
