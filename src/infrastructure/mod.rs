//! Infrastructure layer
//!
//! Configuration and logging shared by tools built on nay.

mod config;
mod logging;

pub use config::{Config, ConfigError, LOG_LEVEL_VAR, OUTPUT_FILE_VAR};
pub use logging::init_logging;
