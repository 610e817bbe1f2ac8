use crate::config::Config;
use crate::lifecycle::LifecycleController;
use anyhow::Result;

/// Re-sign aged zones; reload the server only when something was re-signed.
pub fn execute(config: &Config) -> Result<()> {
    let controller = LifecycleController::new(config);

    if controller.resign_aged()? {
        controller.reload()?;
    }

    Ok(())
}
