//! Prelude module for common imports

pub use crate::pipeline::errors::{EnvError, ValidationError};
pub use crate::pipeline::image::Image;
pub use crate::pipeline::need::{Need, NeedBuilder};
pub use crate::pipeline::rules::{Rule, RuleBuilder, When};
pub use crate::pipeline::types::{Render, Validate};
pub use crate::pipeline::variables::{
    EnvProxy, OptionalEnvProxy, PredefinedVariables, VariableResolver,
};
