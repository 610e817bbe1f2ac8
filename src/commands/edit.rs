use crate::config::Config;
use crate::lifecycle::LifecycleController;
use anyhow::Result;

/// Freeze each requested zone, spawn `$EDITOR` on its signed file, then
/// thaw (which re-signs only when the editor changed something).
pub fn execute(config: &Config, zones: Vec<String>) -> Result<()> {
    let controller = LifecycleController::new(config);
    controller.for_each_signed(&zones, |zone| controller.edit(zone));
    Ok(())
}
