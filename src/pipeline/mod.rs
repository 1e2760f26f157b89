//! GitLab CI keyword objects
//!
//! Each type in this module models one keyword of `.gitlab-ci.yml` and
//! renders to a plain mapping through the [`Render`] trait. Rendered
//! mappings only contain strings, booleans, sequences and string-keyed
//! mappings, so they can be dumped by any YAML or JSON writer.

pub mod errors;
pub mod image;
pub mod need;
pub mod rules;
pub mod types;
pub mod variables;

pub use errors::{EnvError, ValidationError};
pub use image::Image;
pub use need::{DEFAULT_REF, Need, NeedBuilder};
pub use rules::{Rule, RuleBuilder, When};
pub use types::{Render, Validate};
pub use variables::{
    EnvProxy, NOT_RUNNING_IN_A_PIPELINE, OptionalEnvProxy, PredefinedVariables, ProcessEnv,
    VariableResolver,
};
