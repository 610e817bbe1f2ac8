use crate::config::Config;
use crate::lifecycle::LifecycleController;
use anyhow::Result;
use tracing::error;

/// Remove each requested domain; unknown domains are logged and skipped
/// without aborting the batch.
pub fn execute(config: &Config, zones: Vec<String>) -> Result<()> {
    let controller = LifecycleController::new(config);
    for zone in &zones {
        if let Err(err) = controller.remove(zone) {
            error!("{:#}", err);
        }
    }
    Ok(())
}
