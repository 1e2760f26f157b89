//! Configuration management

use crate::pipeline::variables::{ProcessEnv, VariableResolver};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding [`Config::log_level`]
pub const LOG_LEVEL_VAR: &str = "NAY_LOG_LEVEL";

/// Environment variable overriding [`Config::output_file`]
pub const OUTPUT_FILE_VAR: &str = "NAY_OUTPUT_FILE";

/// Errors loading a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The document is not valid YAML for a configuration
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Library configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
    /// File the rendered pipeline is meant to be written to
    pub output_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            output_file: ".gitlab-ci.yml".to_string(),
        }
    }
}

impl Config {
    /// Parses a YAML document. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document cannot be parsed.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Defaults overridden by `NAY_*` variables of the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env(&ProcessEnv)
    }

    /// Overrides fields from `NAY_*` variables found in `env`
    #[must_use]
    pub fn with_env<R: VariableResolver + ?Sized>(mut self, env: &R) -> Self {
        if let Some(level) = env.resolve(LOG_LEVEL_VAR).filter(|v| !v.is_empty()) {
            self.log_level = level;
        }
        if let Some(file) = env.resolve(OUTPUT_FILE_VAR).filter(|v| !v.is_empty()) {
            self.output_file = file;
        }
        self
    }
}
