use crate::paths::DomainPaths;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of per-domain and base-directory template overrides.
const OVERRIDE_FILE: &str = "named.block.tmpl";

/// Built-in zone block written when no override template exists.
///
/// `{domain}` and `{signed_zone}` are substituted at render time.
const DEFAULT_TEMPLATE: &str = r#"zone "{domain}" {
  type master;
  file "{signed_zone}";
  notify yes;
  allow-update {
    key "rndc-key";
  };
  allow-query { any; };
};
"#;

/// Resolves the `named.block` template for a domain.
///
/// Precedence: `<domain dir>/named.block.tmpl`, then
/// `<base dir>/named.block.tmpl`, then the built-in default. Resolution is
/// cached per domain name.
pub struct TemplateResolver {
    base_dir: PathBuf,
    cache: HashMap<String, String>,
}

impl TemplateResolver {
    pub fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            cache: HashMap::new(),
        }
    }

    /// Render the zone block for `paths`.
    pub fn render(&mut self, paths: &DomainPaths) -> Result<String> {
        let template = self.resolve(paths)?;
        Ok(template
            .replace("{domain}", paths.name())
            .replace("{signed_zone}", &paths.signed_zone().display().to_string()))
    }

    fn resolve(&mut self, paths: &DomainPaths) -> Result<String> {
        if let Some(cached) = self.cache.get(paths.name()) {
            return Ok(cached.clone());
        }

        let candidates = [paths.dir().join(OVERRIDE_FILE), self.base_dir.join(OVERRIDE_FILE)];
        let mut template = DEFAULT_TEMPLATE.to_string();
        for candidate in &candidates {
            if candidate.is_file() {
                debug!(
                    "using template override {} for {}",
                    candidate.display(),
                    paths.name()
                );
                template = std::fs::read_to_string(candidate).with_context(|| {
                    format!("failed to read template {}", candidate.display())
                })?;
                break;
            }
        }

        self.cache.insert(paths.name().to_string(), template.clone());
        Ok(template)
    }
}
