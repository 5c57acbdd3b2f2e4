//! Builder configuration.
//!
//! Stored as TOML. Every field has a default, so an empty or missing file is
//! a valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use regurl_model::FacetConfig;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Read { path, .. } => format!("Could not read {}", path.display()),
            Self::Parse(error) => format!("The configuration file is invalid: {}", error.message()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Path (or full URL) of the registration page on the community site.
    pub registration_url_path: Option<String>,
    /// How long the "copied" acknowledgment stays up, in milliseconds.
    pub copy_acknowledgment_ms: u64,
    pub facets: FacetConfig,
    /// Whether the user may copy or open public registration URLs.
    pub can_get_public_url: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            registration_url_path: None,
            copy_acknowledgment_ms: 4000,
            facets: FacetConfig::default(),
            can_get_public_url: true,
        }
    }
}

impl BuilderConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file missing, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn copy_acknowledgment(&self) -> Duration {
        Duration::from_millis(self.copy_acknowledgment_ms)
    }
}
