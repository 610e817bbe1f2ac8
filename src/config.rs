use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default re-sign interval in minutes (3 days).
const DEFAULT_RESIGN_TIME: u64 = 60 * 24 * 3;

/// Configuration for dnssecctl
///
/// Values come from (lowest to highest precedence): built-in defaults, the
/// optional config file, CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base directory where per-domain signing artifacts live
    pub base_dir: PathBuf,
    /// Re-sign interval for `cron` in minutes
    pub resign_time: u64,
    /// Key generation tool, name or path
    pub dnssec_keygen: String,
    /// Zone signing tool, name or path
    pub dnssec_signzone: String,
    /// Server control tool, name or path
    pub rndc: String,
    /// Owner applied to generated files
    pub user: String,
    /// Group applied to generated files
    pub group: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("/etc/bind/zones.signed"),
            resign_time: DEFAULT_RESIGN_TIME,
            dnssec_keygen: "dnssec-keygen".to_string(),
            dnssec_signzone: "dnssec-signzone".to_string(),
            rndc: "rndc".to_string(),
            user: "bind".to_string(),
            group: "bind".to_string(),
        }
    }
}

impl Config {
    /// Get config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dnssecctl").join("config.toml"))
    }

    /// Load config from the default file location, falling back to defaults
    /// when no file exists.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                let config: Config = toml::from_str(&contents)
                    .with_context(|| format!("failed to parse config file {}", path.display()))?;
                Ok(config)
            }
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.base_dir, PathBuf::from("/etc/bind/zones.signed"));
        assert_eq!(config.resign_time, 4320);
        assert_eq!(config.dnssec_keygen, "dnssec-keygen");
        assert_eq!(config.dnssec_signzone, "dnssec-signzone");
        assert_eq!(config.rndc, "rndc");
        assert_eq!(config.user, "bind");
        assert_eq!(config.group, "bind");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();

        assert!(toml_str.contains("base_dir"));
        assert!(toml_str.contains("zones.signed"));
        assert!(toml_str.contains("resign_time"));
    }

    #[test]
    fn test_config_deserialization_partial() {
        let toml_str = r#"
            base_dir = "/srv/zones"
            user = "named"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.base_dir, PathBuf::from("/srv/zones"));
        assert_eq!(config.user, "named");
        // untouched fields keep their defaults
        assert_eq!(config.resign_time, 4320);
        assert_eq!(config.group, "bind");
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.base_dir = PathBuf::from("/var/lib/zones");
        config.resign_time = 60;

        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.base_dir, deserialized.base_dir);
        assert_eq!(config.resign_time, deserialized.resign_time);
    }
}
