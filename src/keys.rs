use crate::errors::CliError;
use crate::ownership::Owner;
use crate::paths::{DomainPaths, KeyRole};
use crate::tools::ProcessRunner;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

/// Ensures signing keys exist for a domain, generating them with the
/// external key generation tool when absent.
pub struct KeyManager<'a> {
    runner: &'a dyn ProcessRunner,
    keygen: &'a Path,
    owner: &'a Owner,
}

impl<'a> KeyManager<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, keygen: &'a Path, owner: &'a Owner) -> Self {
        Self {
            runner,
            keygen,
            owner,
        }
    }

    /// Make sure the key pair for `role` exists in the domain directory.
    ///
    /// Existence of both `{role}.key` and `{role}.private` counts as
    /// present; content is never validated and keys are never regenerated.
    pub fn ensure_key(&self, paths: &DomainPaths, role: KeyRole) -> Result<()> {
        if paths.key_file(role, "key").is_file() && paths.key_file(role, "private").is_file() {
            debug!("key {} for {} already present", role.name(), paths.name());
            return Ok(());
        }

        info!("creating key {} for {}", role.name(), paths.name());

        // Scratch directory for the generator; removed on drop, also on the
        // error paths below.
        let scratch = tempfile::tempdir().context("failed to create key scratch directory")?;

        let mut args: Vec<String> = vec![
            "-A".into(),
            "-3".into(),
            "-K".into(),
            scratch.path().display().to_string(),
        ];
        args.extend(role.keygen_flags().iter().map(|flag| flag.to_string()));
        args.extend([
            "-a".into(),
            "RSASHA256".into(),
            "-n".into(),
            "ZONE".into(),
            paths.name().to_string(),
        ]);

        self.runner.run(self.keygen, &args)?;
        self.collect_generated(scratch.path(), paths, role)
    }

    /// Move the generated files into the domain directory and alias them
    /// under the stable role name.
    fn collect_generated(&self, scratch: &Path, paths: &DomainPaths, role: KeyRole) -> Result<()> {
        let prefix = format!("K{}", paths.name());
        let mut found = false;

        for entry in std::fs::read_dir(scratch).context("failed to read key scratch directory")? {
            let entry = entry?;
            let key_name = entry.file_name().to_string_lossy().into_owned();
            if !key_name.starts_with(&prefix) {
                continue;
            }
            found = true;

            let ext = entry
                .path()
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
                .unwrap_or_default();
            let alias = format!("{}.{}", role.name(), ext);
            debug!("work on {} alias {}", key_name, alias);

            let dst = paths.dir().join(&key_name);
            std::fs::copy(entry.path(), &dst)
                .with_context(|| format!("failed to copy key file {}", key_name))?;

            // relative link so the directory stays relocatable; a stale
            // alias from a half-present pair is replaced
            let alias_path = paths.dir().join(&alias);
            match std::fs::remove_file(&alias_path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(err).with_context(|| {
                        format!("failed to replace stale alias {}", alias_path.display())
                    })
                }
            }
            #[cfg(unix)]
            std::os::unix::fs::symlink(&key_name, &alias_path)
                .with_context(|| format!("failed to link {} to {}", alias, key_name))?;
            #[cfg(not(unix))]
            std::fs::copy(&dst, &alias_path)
                .with_context(|| format!("failed to alias {} as {}", key_name, alias))?;

            self.owner.apply(&dst);
            self.owner.apply(&alias_path);
        }

        if !found {
            return Err(CliError::ToolFailure {
                command: format!(
                    "{} produced no {}* files for {}",
                    self.keygen.display(),
                    prefix,
                    role.name()
                ),
            }
            .into());
        }

        Ok(())
    }
}
