use crate::config::Config;
use crate::lifecycle::LifecycleController;
use anyhow::Result;

/// Thaw every requested zone, re-signing the ones whose signed zone changed
/// while frozen.
pub fn execute(config: &Config, zones: Vec<String>) -> Result<()> {
    let controller = LifecycleController::new(config);
    controller.for_each_signed(&zones, |zone| controller.thaw(zone));
    Ok(())
}
