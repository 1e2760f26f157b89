//! # Nay - GitLab CI configuration in Rust
//!
//! Nay provides typed, declarative builders for the keywords of a
//! `.gitlab-ci.yml` pipeline. Every object renders to a plain YAML mapping
//! that can be combined and dumped by any serializer.
//!
//! ## Quick Start
//!
//! ```
//! use nay::prelude::*;
//!
//! let image = Image::new("alpine").with_tag("3.18");
//! assert_eq!(serde_yaml::to_string(&image).unwrap(), "name: alpine:3.18\n");
//!
//! let rule = Rule::builder()
//!     .if_statement("$CI_COMMIT_BRANCH == \"main\"")
//!     .allow_failure(true)
//!     .build();
//! assert_eq!(rule.never().when(), When::Never);
//! ```
//!
//! ## Features
//!
//! - **Validated construction**: invalid `needs` combinations never exist as values
//! - **Copy-on-modify**: derive variants of shared images and rules safely
//! - **Lazy environment**: predefined `CI_*` variables are read only when used
//!   and degrade to placeholders outside of a pipeline
//!
//! ## License
//!
//! Licensed under either of
//! - Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <https://www.apache.org/licenses/LICENSE-2.0>)
//! - MIT license ([LICENSE-MIT](LICENSE-MIT) or <https://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod infrastructure;
pub mod pipeline;

// Prelude module for common imports
pub mod prelude;

// Re-export commonly used types
pub use infrastructure::{Config, ConfigError, init_logging};
pub use pipeline::{
    EnvError, EnvProxy, Image, Need, NeedBuilder, OptionalEnvProxy, PredefinedVariables, Render,
    Rule, RuleBuilder, Validate, ValidationError, VariableResolver, When,
};

/// Version of the nay crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
