//! Runtime configuration. Values come from three places, highest priority
//! first: command-line flags (which also read `REGATTA_*` environment
//! variables through clap), then the TOML file in the application directory,
//! then built-in defaults. The API base URL has no default: it must be
//! configured exactly once, somewhere.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use directories::BaseDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Folder name used beneath the user's home directory for application files.
const APP_DIR_NAME: &str = ".regatta-admin";
/// Configuration file looked up inside the application directory.
const CONFIG_FILE_NAME: &str = "config.toml";
/// Log file written inside the application directory.
const LOG_FILE_NAME: &str = "regatta-admin.log";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base address of the regatta API, e.g. `https://regatta.example.com`.
    pub api_url: Option<String>,
    /// Per-request timeout. Unset means requests never time out.
    pub request_timeout_secs: Option<u64>,
    /// `tracing` filter directive for the log file.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            request_timeout_secs: None,
            log_level: String::from("info"),
        }
    }
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}

impl Config {
    /// Resolve the effective configuration. An explicit `path` must exist;
    /// the default file is optional.
    pub fn load(path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = default_config_path()?;
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Layer command-line and environment values over the file values.
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(api_url) = overrides.api_url {
            self.api_url = Some(api_url);
        }
        if let Some(timeout) = overrides.request_timeout_secs {
            self.request_timeout_secs = Some(timeout);
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let raw = self.api_url()?;
        let url = Url::parse(raw).with_context(|| format!("API base URL '{raw}' is not a URL"))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("API base URL must use http or https, got '{}'", url.scheme());
        }
        if self.request_timeout_secs == Some(0) {
            bail!("request_timeout_secs must be greater than 0");
        }
        if self.log_level.trim().is_empty() {
            bail!("log_level must not be empty");
        }
        Ok(())
    }

    /// The configured base URL, or a hint on where to set it.
    pub fn api_url(&self) -> Result<&str> {
        self.api_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "no API base URL configured; pass --api-url, set REGATTA_API_URL, \
                     or add api_url to ~/{APP_DIR_NAME}/{CONFIG_FILE_NAME}"
                )
            })
    }

    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Application directory inside the user's home.
pub fn app_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(APP_DIR_NAME))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(app_dir()?.join(CONFIG_FILE_NAME))
}

pub fn log_path() -> Result<PathBuf> {
    Ok(app_dir()?.join(LOG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn with_url(url: &str) -> Config {
        Config {
            api_url: Some(url.to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn missing_api_url_is_rejected() {
        let err = Config::default().validate().unwrap_err();
        assert!(err.to_string().contains("--api-url"));
    }

    #[test]
    fn valid_config_passes() {
        assert!(with_url("http://localhost:5000").validate().is_ok());
    }

    #[test]
    fn malformed_url_is_rejected() {
        assert!(with_url("not a url").validate().is_err());
        assert!(with_url("ftp://example.com").validate().is_err());
        assert!(with_url("   ").validate().is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = with_url("http://localhost:5000");
        config.request_timeout_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn overrides_win_over_file_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "api_url = \"http://from-file:5000\"\nrequest_timeout_secs = 15"
        )
        .unwrap();

        let config = Config::load(
            Some(file.path()),
            Overrides {
                api_url: Some("https://from-flag.example.com".to_string()),
                ..Overrides::default()
            },
        )
        .unwrap();

        assert_eq!(config.api_url().unwrap(), "https://from-flag.example.com");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn explicit_config_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Config::load(Some(&missing), Overrides::default()).is_err());
    }
}
