use crate::config::Config;
use crate::errors::CliError;
use crate::keys::KeyManager;
use crate::ownership::Owner;
use crate::paths::{self, DomainPaths, KeyRole};
use crate::signer::ZoneSigner;
use crate::template::TemplateResolver;
use crate::tools::{locate_tool, ProcessRunner, SystemRunner};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, error, info, warn};

/// Drives a domain through its signing lifecycle.
///
/// Per-domain states: absent, initialized (signed), frozen. `init` moves a
/// domain from absent to initialized, `freeze`/`thaw` toggle the frozen
/// state (tracked solely by the freeze marker file), `remove` deletes the
/// domain, and `cron` re-signs initialized domains whose signed zone has
/// aged past the configured interval.
pub struct LifecycleController {
    base_dir: PathBuf,
    resign_time: u64,
    keygen: PathBuf,
    signzone: PathBuf,
    rndc: PathBuf,
    owner: Owner,
    templates: TemplateResolver,
    runner: Box<dyn ProcessRunner>,
}

impl LifecycleController {
    pub fn new(config: &Config) -> Self {
        Self::with_runner(config, Box::new(SystemRunner))
    }

    pub fn with_runner(config: &Config, runner: Box<dyn ProcessRunner>) -> Self {
        Self {
            base_dir: config.base_dir.clone(),
            resign_time: config.resign_time,
            keygen: locate_tool(&config.dnssec_keygen),
            signzone: locate_tool(&config.dnssec_signzone),
            rndc: locate_tool(&config.rndc),
            owner: Owner::new(&config.user, &config.group),
            templates: TemplateResolver::new(&config.base_dir),
            runner,
        }
    }

    pub fn domain(&self, zone: &str) -> DomainPaths {
        DomainPaths::for_domain(&self.base_dir, zone)
    }

    fn keys(&self) -> KeyManager<'_> {
        KeyManager::new(self.runner.as_ref(), &self.keygen, &self.owner)
    }

    fn signer(&self) -> ZoneSigner<'_> {
        ZoneSigner::new(self.runner.as_ref(), &self.signzone, &self.owner)
    }

    /// Initialize every source file in turn; missing files and failed
    /// domains are logged, counted and skipped. When at least one domain
    /// was initialized the caller is expected to rebuild the aggregate
    /// config and reload the server.
    pub fn init_domains(&mut self, sources: &[PathBuf]) -> InitSummary {
        let mut summary = InitSummary::default();
        for source in sources {
            if !source.is_file() {
                error!("{}", CliError::SourceNotFound(source.clone()));
                summary.failed += 1;
                continue;
            }
            info!(
                "init zone from {} to {}",
                source.display(),
                self.base_dir.display()
            );
            match self.init_domain(source) {
                Ok(()) => summary.initialized += 1,
                Err(err) => {
                    error!("init of {} failed: {:#}", source.display(), err);
                    summary.failed += 1;
                }
            }
        }
        summary
    }

    /// absent -> initialized. Each step is fatal on error and
    /// short-circuits the rest for this domain.
    pub fn init_domain(&mut self, source: &Path) -> Result<()> {
        let paths = DomainPaths::from_source(&self.base_dir, source);
        info!("init domain {} from {}", paths.name(), source.display());

        if paths.dir().exists() {
            std::fs::remove_dir_all(paths.dir())
                .with_context(|| format!("failed to wipe {}", paths.dir().display()))?;
        }
        std::fs::create_dir_all(paths.dir())
            .with_context(|| format!("failed to create {}", paths.dir().display()))?;
        self.owner.apply(paths.dir());

        std::fs::copy(source, paths.original_zone())
            .with_context(|| format!("failed to copy {}", source.display()))?;
        self.owner.apply(&paths.original_zone());

        self.keys().ensure_key(&paths, KeyRole::Zsk)?;
        self.keys().ensure_key(&paths, KeyRole::Ksk)?;

        let unsigned = self.signer().prepare(&paths)?;
        self.signer().sign(&paths, Some(&unsigned))?;

        self.write_named_block(&paths)?;
        Ok(())
    }

    fn write_named_block(&mut self, paths: &DomainPaths) -> Result<()> {
        let block = self.templates.render(paths)?;
        let named_block = paths.named_block();
        std::fs::write(&named_block, block)
            .with_context(|| format!("failed to write {}", named_block.display()))?;
        self.owner.apply(&named_block);
        Ok(())
    }

    /// initialized -> frozen. A second freeze is an idempotent no-op.
    pub fn freeze(&self, zone: &str) -> Result<()> {
        let paths = self.domain(zone);
        let marker = paths.freeze_marker();
        if marker.exists() {
            warn!("{}, skipping!", CliError::AlreadyFrozen(zone.to_string()));
            return Ok(());
        }

        self.runner
            .run(&self.rndc, &["freeze".to_string(), zone.to_string()])?;
        std::fs::copy(paths.signed_zone(), &marker)
            .with_context(|| format!("failed to snapshot {}", paths.signed_zone().display()))?;
        info!("froze zone {}", zone);
        Ok(())
    }

    /// frozen -> initialized, but only when the signed zone actually
    /// changed while frozen. An unchanged zone stays frozen: the marker is
    /// kept and no thaw directive is issued.
    pub fn thaw(&self, zone: &str) -> Result<()> {
        let paths = self.domain(zone);
        let marker = paths.freeze_marker();
        if !marker.exists() {
            warn!("{}, skipping!", CliError::NotFrozen(zone.to_string()));
            return Ok(());
        }

        let snapshot = std::fs::read(&marker)
            .with_context(|| format!("failed to read {}", marker.display()))?;
        let current = std::fs::read(paths.signed_zone())
            .with_context(|| format!("failed to read {}", paths.signed_zone().display()))?;
        if snapshot == current {
            warn!("zone {} was not changed, skipping!", zone);
            return Ok(());
        }

        self.signer().sign(&paths, None)?;
        self.runner
            .run(&self.rndc, &["thaw".to_string(), zone.to_string()])?;
        std::fs::remove_file(&marker)
            .with_context(|| format!("failed to remove {}", marker.display()))?;
        info!("thawed zone {}", zone);
        Ok(())
    }

    /// any state -> absent. Unknown domains are an error naming the domain;
    /// names that would resolve outside the base directory are rejected
    /// before any path is built.
    pub fn remove(&self, zone: &str) -> Result<()> {
        if !paths::is_valid_zone_name(zone) {
            return Err(CliError::InvalidZoneName(zone.to_string()).into());
        }
        let paths = self.domain(zone);
        if !paths.dir().is_dir() {
            return Err(CliError::DomainNotFound(zone.to_string()).into());
        }
        info!("remove zone {}", paths.dir().display());
        std::fs::remove_dir_all(paths.dir())
            .with_context(|| format!("failed to remove {}", paths.dir().display()))?;
        Ok(())
    }

    /// Freeze, hand the signed zone to `$EDITOR`, then thaw. The thaw step
    /// re-signs only when the editor actually changed the file.
    pub fn edit(&self, zone: &str) -> Result<()> {
        self.freeze(zone)?;

        let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
        let signed = self.domain(zone).signed_zone();
        self.runner
            .run(Path::new(&editor), &[signed.display().to_string()])?;

        self.thaw(zone)
    }

    /// Re-sign every non-frozen domain whose signed zone is older than the
    /// configured interval. Returns whether anything was re-signed.
    pub fn resign_aged(&self) -> Result<bool> {
        let threshold = Duration::from_secs(self.resign_time * 60);
        let mut resigned = false;

        let entries = std::fs::read_dir(&self.base_dir)
            .with_context(|| format!("failed to read {}", self.base_dir.display()))?;
        for entry in entries {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let paths = self.domain(&entry.file_name().to_string_lossy());
            let signed = paths.signed_zone();
            if !signed.is_file() {
                continue;
            }
            if paths.freeze_marker().exists() {
                debug!("zone {} is frozen, not re-signing", paths.name());
                continue;
            }

            let age = std::fs::metadata(&signed)?
                .modified()
                .map(|mtime| SystemTime::now().duration_since(mtime).unwrap_or_default())
                .unwrap_or_default();
            if age <= threshold {
                debug!("zone {} is fresh, not re-signing", paths.name());
                continue;
            }

            info!("re-signing aged zone {}", paths.name());
            match self.signer().sign(&paths, None) {
                Ok(()) => resigned = true,
                Err(err) => error!("re-sign of {} failed: {:#}", paths.name(), err),
            }
        }
        Ok(resigned)
    }

    /// Reload configuration file and zones.
    pub fn reload(&self) -> Result<()> {
        info!("reload configuration file and zones");
        self.runner.run(&self.rndc, &["reload".to_string()])?;
        Ok(())
    }

    /// Run `f` for every requested zone that has a signed zone on disk;
    /// invalid names and the rest are logged as errors and skipped without
    /// aborting the batch. Failures of `f` itself are handled the same way.
    pub fn for_each_signed<F>(&self, zones: &[String], mut f: F)
    where
        F: FnMut(&str) -> Result<()>,
    {
        for zone in zones {
            if !paths::is_valid_zone_name(zone) {
                error!("{}", CliError::InvalidZoneName(zone.clone()));
                continue;
            }
            if !self.domain(zone).signed_zone().is_file() {
                error!("{}", CliError::ZoneNotFound(zone.clone()));
                continue;
            }
            if let Err(err) = f(zone) {
                error!("{}: {:#}", zone, err);
            }
        }
    }
}

/// Per-batch outcome of [`LifecycleController::init_domains`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InitSummary {
    pub initialized: usize,
    pub failed: usize,
}
