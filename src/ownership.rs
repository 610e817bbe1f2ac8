use std::path::Path;
use tracing::warn;

/// File ownership applied to generated artifacts.
///
/// Ownership is always best-effort: failures are logged as warnings and
/// never affect control flow, since running unprivileged (e.g. in tests)
/// is a supported mode.
#[derive(Debug, Clone)]
pub struct Owner {
    user: String,
    group: String,
}

impl Owner {
    pub fn new(user: &str, group: &str) -> Self {
        Self {
            user: user.to_string(),
            group: group.to_string(),
        }
    }

    #[cfg(unix)]
    pub fn apply(&self, path: &Path) {
        match self.resolve_ids() {
            Some((uid, gid)) => {
                if let Err(err) = std::os::unix::fs::chown(path, Some(uid), Some(gid)) {
                    warn!(
                        "can't change owner of {} to {}:{}: {}",
                        path.display(),
                        self.user,
                        self.group,
                        err
                    );
                }
            }
            None => warn!(
                "can't change owner of {} to {}:{}: unknown user or group",
                path.display(),
                self.user,
                self.group
            ),
        }
    }

    #[cfg(not(unix))]
    pub fn apply(&self, path: &Path) {
        warn!(
            "can't change owner of {} to {}:{}: unsupported platform",
            path.display(),
            self.user,
            self.group
        );
    }

    #[cfg(unix)]
    fn resolve_ids(&self) -> Option<(u32, u32)> {
        let user = nix::unistd::User::from_name(&self.user).ok().flatten()?;
        let group = nix::unistd::Group::from_name(&self.group).ok().flatten()?;
        Some((user.uid.as_raw(), group.gid.as_raw()))
    }
}
