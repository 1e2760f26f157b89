//! Error types for pipeline configuration objects

use thiserror::Error;

/// Errors raised while resolving lazily read environment variables
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvError {
    /// A required variable was read inside a pipeline but is not set
    #[error("Environment variable '{key}' is not set in the current pipeline")]
    MissingEnvironmentValue {
        /// Name of the missing variable.
        key: String,
    },
}

/// Validation errors for configuration objects
///
/// All variants are raised at construction time and are correctable by the
/// caller. No partially built object is ever returned alongside them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Neither `job` nor `pipeline` was given to a need
    #[error("At least one of `job` or `pipeline` must be set")]
    MissingRequiredReference,

    /// `ref` was given without `project`
    #[error("The `ref` parameter requires the `project` parameter")]
    DanglingRefQualifier,

    /// Both `project` and `pipeline` were given
    #[error("Needs accepts either `project` or `pipeline` but not both")]
    ConflictingReferenceTarget,

    /// `pipeline` names the pipeline currently being generated
    #[error(
        "The pipeline attribute does not accept the current pipeline ({pipeline}). \
         To download artifacts from a job in the current pipeline, use the basic form of needs"
    )]
    SelfReferentialPipeline {
        /// The rejected pipeline identifier.
        pipeline: String,
    },

    /// Image name cannot be empty
    #[error("Image name cannot be empty")]
    EmptyImageName,

    /// An environment lookup needed for validation failed
    #[error(transparent)]
    Environment(#[from] EnvError),
}
