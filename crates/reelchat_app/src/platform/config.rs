//! `reelchat.ron` loading and CLI overrides.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reelchat_engine::DispatchSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;

pub const DEFAULT_CONFIG_PATH: &str = "reelchat.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("invalid webhook url {url:?}: {source}")]
    InvalidEndpoint { url: String, source: url::ParseError },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Webhook URLs, tried in order.
    pub endpoints: Vec<String>,
    pub request_timeout_ms: u64,
    pub debug: bool,
    pub log_destination: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            request_timeout_ms: 360_000,
            debug: false,
            log_destination: LogDestination::File,
        }
    }
}

impl AppConfig {
    /// Reads `path`; `None` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: Self = ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(Some(config))
    }

    /// Command-line endpoints replace the configured list; `--debug` only ever turns debug on.
    pub fn with_overrides(mut self, endpoints: Vec<String>, debug: bool) -> Result<Self, ConfigError> {
        if !endpoints.is_empty() {
            self.endpoints = endpoints;
        }
        self.debug |= debug;
        self.validate()?;
        Ok(self)
    }

    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            endpoints: self.endpoints.clone(),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            ..DispatchSettings::default()
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for endpoint in &self.endpoints {
            url::Url::parse(endpoint).map_err(|source| ConfigError::InvalidEndpoint {
                url: endpoint.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = AppConfig::load(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(loaded, None);
        let config = loaded.unwrap_or_default();
        assert_eq!(
            config.dispatch_settings().request_timeout,
            Duration::from_secs(360)
        );
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let file = write_config(
            r#"(endpoints: ["https://hooks.example.com/a", "https://hooks.example.com/b"], debug: true)"#,
        );
        let config = AppConfig::load(file.path()).unwrap().expect("file exists");
        assert_eq!(config.endpoints.len(), 2);
        assert!(config.debug);
        assert_eq!(config.request_timeout_ms, 360_000);
        assert_eq!(config.log_destination, LogDestination::File);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let file = write_config("(endpoints: [");
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let file = write_config(r#"(endpoints: ["not a url"])"#);
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn cli_endpoints_replace_configured_ones() {
        let config = AppConfig {
            endpoints: vec!["https://hooks.example.com/a".to_string()],
            ..AppConfig::default()
        }
        .with_overrides(vec!["http://localhost:5678/webhook".to_string()], true)
        .unwrap();
        assert_eq!(config.endpoints, vec!["http://localhost:5678/webhook"]);
        assert!(config.debug);

        let kept = AppConfig::default().with_overrides(Vec::new(), false).unwrap();
        assert_eq!(kept, AppConfig::default());
    }
}
