//! Lazily resolved environment variables
//!
//! GitLab exposes pipeline metadata through predefined `CI_*` environment
//! variables. The proxies in this module only name a variable; its value is
//! looked up each time it is read, so a library of descriptors can be declared
//! as constants without touching the environment.
//!
//! Outside of a pipeline (the `CI` indicator is unset or empty) a required
//! proxy does not fail. It returns [`NOT_RUNNING_IN_A_PIPELINE`] for every
//! variable, and an empty string for `CI` itself:
//!
//! ```
//! use std::collections::HashMap;
//! use nay::pipeline::PredefinedVariables;
//!
//! let local: HashMap<String, String> = HashMap::new();
//! let id = PredefinedVariables::CI_PIPELINE_ID.value_in(&local).unwrap();
//! assert_eq!(id, "notRunningInAPipeline");
//! ```

use super::errors::EnvError;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// Value returned by required proxies when not running in a pipeline
pub const NOT_RUNNING_IN_A_PIPELINE: &str = "notRunningInAPipeline";

/// Name of the variable GitLab sets in every pipeline job
const PIPELINE_INDICATOR: &str = "CI";

/// Source of environment variable values
pub trait VariableResolver {
    /// Resolves a variable value
    fn resolve(&self, name: &str) -> Option<String>;
}

/// The environment of the current process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl VariableResolver for ProcessEnv {
    fn resolve(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl VariableResolver for HashMap<String, String> {
    fn resolve(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

fn in_pipeline<R: VariableResolver + ?Sized>(env: &R) -> bool {
    env.resolve(PIPELINE_INDICATOR)
        .is_some_and(|value| !value.is_empty())
}

/// A required environment variable, resolved on every read
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvProxy {
    key: Cow<'static, str>,
}

impl EnvProxy {
    /// Declares a proxy for a statically known variable name
    #[must_use]
    pub const fn new(key: &'static str) -> Self {
        Self {
            key: Cow::Borrowed(key),
        }
    }

    /// Declares a proxy for a variable name only known at runtime
    #[must_use]
    pub fn named(key: impl Into<String>) -> Self {
        Self {
            key: Cow::Owned(key.into()),
        }
    }

    /// Name of the proxied variable
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the variable from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::MissingEnvironmentValue`] if running in a pipeline
    /// and the variable is not set.
    pub fn value(&self) -> Result<String, EnvError> {
        self.value_in(&ProcessEnv)
    }

    /// Reads the variable from `env`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::MissingEnvironmentValue`] if `env` marks a running
    /// pipeline and the variable is not set.
    pub fn value_in<R: VariableResolver + ?Sized>(&self, env: &R) -> Result<String, EnvError> {
        if in_pipeline(env) {
            return env
                .resolve(&self.key)
                .ok_or_else(|| EnvError::MissingEnvironmentValue {
                    key: self.key.to_string(),
                });
        }

        if self.key == PIPELINE_INDICATOR {
            return Ok(String::new());
        }

        tracing::debug!(key = %self.key, "Not running in a pipeline, using placeholder value");
        Ok(NOT_RUNNING_IN_A_PIPELINE.to_string())
    }
}

/// Formats as a CI variable reference, e.g. `$CI_PIPELINE_ID`
impl fmt::Display for EnvProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.key)
    }
}

/// An environment variable whose absence is not an error
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OptionalEnvProxy {
    key: Cow<'static, str>,
}

impl OptionalEnvProxy {
    /// Declares a proxy for a statically known variable name
    #[must_use]
    pub const fn new(key: &'static str) -> Self {
        Self {
            key: Cow::Borrowed(key),
        }
    }

    /// Declares a proxy for a variable name only known at runtime
    #[must_use]
    pub fn named(key: impl Into<String>) -> Self {
        Self {
            key: Cow::Owned(key.into()),
        }
    }

    /// Name of the proxied variable
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the variable from the process environment
    #[must_use]
    pub fn value(&self) -> Option<String> {
        self.value_in(&ProcessEnv)
    }

    /// Reads the variable from `env`
    #[must_use]
    pub fn value_in<R: VariableResolver + ?Sized>(&self, env: &R) -> Option<String> {
        env.resolve(&self.key)
    }
}

impl fmt::Display for OptionalEnvProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.key)
    }
}

/// [GitLab CI predefined variables](https://docs.gitlab.com/ee/ci/variables/predefined_variables.html)
pub struct PredefinedVariables;

impl PredefinedVariables {
    /// Set to `true` in every pipeline job. Empty outside of a pipeline.
    pub const CI: EnvProxy = EnvProxy::new("CI");

    /// Source chat channel that triggered a ChatOps command
    pub const CHAT_CHANNEL: EnvProxy = EnvProxy::new("CHAT_CHANNEL");

    /// The unique identifier of the current pipeline.
    ///
    /// Reading it inside a pipeline fails if the variable is missing.
    pub const CI_PIPELINE_ID: EnvProxy = EnvProxy::new("CI_PIPELINE_ID");

    /// The project-level identifier of the current pipeline
    pub const CI_PIPELINE_IID: EnvProxy = EnvProxy::new("CI_PIPELINE_IID");

    /// How the pipeline was triggered, e.g. `push` or `schedule`
    pub const CI_PIPELINE_SOURCE: EnvProxy = EnvProxy::new("CI_PIPELINE_SOURCE");

    /// Project namespace with the project name
    pub const CI_PROJECT_PATH: EnvProxy = EnvProxy::new("CI_PROJECT_PATH");

    /// Name of the directory for the project
    pub const CI_PROJECT_NAME: EnvProxy = EnvProxy::new("CI_PROJECT_NAME");

    /// Full path the repository is cloned to
    pub const CI_PROJECT_DIR: EnvProxy = EnvProxy::new("CI_PROJECT_DIR");

    /// The ID of the current project
    pub const CI_PROJECT_ID: EnvProxy = EnvProxy::new("CI_PROJECT_ID");

    /// The commit revision the project is built for
    pub const CI_COMMIT_SHA: EnvProxy = EnvProxy::new("CI_COMMIT_SHA");

    /// The first eight characters of `CI_COMMIT_SHA`
    pub const CI_COMMIT_SHORT_SHA: EnvProxy = EnvProxy::new("CI_COMMIT_SHORT_SHA");

    /// The branch or tag name the project is built for
    pub const CI_COMMIT_REF_NAME: EnvProxy = EnvProxy::new("CI_COMMIT_REF_NAME");

    /// `CI_COMMIT_REF_NAME` lowercased and shortened for use in URLs and host names
    pub const CI_COMMIT_REF_SLUG: EnvProxy = EnvProxy::new("CI_COMMIT_REF_SLUG");

    /// The name of the project's default branch
    pub const CI_DEFAULT_BRANCH: EnvProxy = EnvProxy::new("CI_DEFAULT_BRANCH");

    /// The internal ID of the job
    pub const CI_JOB_ID: EnvProxy = EnvProxy::new("CI_JOB_ID");

    /// The name of the job
    pub const CI_JOB_NAME: EnvProxy = EnvProxy::new("CI_JOB_NAME");

    /// The base URL of the GitLab instance
    pub const CI_SERVER_URL: EnvProxy = EnvProxy::new("CI_SERVER_URL");

    /// The username of the user who started the pipeline
    pub const GITLAB_USER_LOGIN: EnvProxy = EnvProxy::new("GITLAB_USER_LOGIN");

    /// The commit branch name. Not set in merge request pipelines or tag pipelines.
    pub const CI_COMMIT_BRANCH: OptionalEnvProxy = OptionalEnvProxy::new("CI_COMMIT_BRANCH");

    /// The commit tag name. Only set in pipelines for tags.
    pub const CI_COMMIT_TAG: OptionalEnvProxy = OptionalEnvProxy::new("CI_COMMIT_TAG");

    /// The project-level IID of the merge request. Only set in merge request pipelines.
    pub const CI_MERGE_REQUEST_IID: OptionalEnvProxy =
        OptionalEnvProxy::new("CI_MERGE_REQUEST_IID");

    /// The source branch name of the merge request
    pub const CI_MERGE_REQUEST_SOURCE_BRANCH_NAME: OptionalEnvProxy =
        OptionalEnvProxy::new("CI_MERGE_REQUEST_SOURCE_BRANCH_NAME");

    /// The target branch name of the merge request
    pub const CI_MERGE_REQUEST_TARGET_BRANCH_NAME: OptionalEnvProxy =
        OptionalEnvProxy::new("CI_MERGE_REQUEST_TARGET_BRANCH_NAME");

    /// Pull request ID from GitHub in external pull request pipelines
    pub const CI_EXTERNAL_PULL_REQUEST_IID: OptionalEnvProxy =
        OptionalEnvProxy::new("CI_EXTERNAL_PULL_REQUEST_IID");

    /// Returns true if the process runs inside a pipeline job
    #[must_use]
    pub fn is_running_in_pipeline() -> bool {
        in_pipeline(&ProcessEnv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> HashMap<String, String> {
        vars.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_required_in_pipeline_returns_live_value() {
        let env = env(&[("CI", "true"), ("CI_PIPELINE_ID", "4711")]);
        assert_eq!(
            PredefinedVariables::CI_PIPELINE_ID.value_in(&env).unwrap(),
            "4711"
        );
    }

    #[test]
    fn test_required_in_pipeline_missing_fails() {
        let env = env(&[("CI", "true")]);
        let err = PredefinedVariables::CI_PIPELINE_ID
            .value_in(&env)
            .unwrap_err();
        assert_eq!(
            err,
            EnvError::MissingEnvironmentValue {
                key: "CI_PIPELINE_ID".to_string()
            }
        );
    }

    #[test]
    fn test_required_outside_pipeline_returns_placeholder() {
        let env = env(&[]);
        assert_eq!(
            PredefinedVariables::CI_COMMIT_SHA.value_in(&env).unwrap(),
            NOT_RUNNING_IN_A_PIPELINE
        );
    }

    #[test]
    fn test_required_outside_pipeline_ignores_live_value() {
        let env = env(&[("CI_PIPELINE_ID", "4711")]);
        assert_eq!(
            PredefinedVariables::CI_PIPELINE_ID.value_in(&env).unwrap(),
            NOT_RUNNING_IN_A_PIPELINE
        );
    }

    #[test]
    fn test_indicator_outside_pipeline_is_empty() {
        assert_eq!(PredefinedVariables::CI.value_in(&env(&[])).unwrap(), "");
        assert_eq!(
            PredefinedVariables::CI.value_in(&env(&[("CI", "")])).unwrap(),
            ""
        );
    }

    #[test]
    fn test_empty_indicator_is_not_a_pipeline() {
        let env = env(&[("CI", "")]);
        assert_eq!(
            PredefinedVariables::CI_JOB_ID.value_in(&env).unwrap(),
            NOT_RUNNING_IN_A_PIPELINE
        );
    }

    #[test]
    fn test_value_is_resolved_on_every_read() {
        let proxy = EnvProxy::named("DEPLOY_TARGET");
        let mut env = env(&[("CI", "true"), ("DEPLOY_TARGET", "staging")]);
        assert_eq!(proxy.value_in(&env).unwrap(), "staging");

        env.insert("DEPLOY_TARGET".to_string(), "production".to_string());
        assert_eq!(proxy.value_in(&env).unwrap(), "production");
    }

    #[test]
    fn test_optional_returns_live_value_or_none() {
        let proxy = PredefinedVariables::CI_COMMIT_TAG;
        assert_eq!(proxy.value_in(&env(&[])), None);
        assert_eq!(
            proxy.value_in(&env(&[("CI_COMMIT_TAG", "v1.0.0")])),
            Some("v1.0.0".to_string())
        );
    }

    #[test]
    fn test_optional_ignores_pipeline_indicator() {
        let proxy = OptionalEnvProxy::new("CI");
        assert_eq!(proxy.value_in(&env(&[])), None);
    }

    #[test]
    fn test_display_as_variable_reference() {
        assert_eq!(PredefinedVariables::CI_PIPELINE_ID.to_string(), "$CI_PIPELINE_ID");
        assert_eq!(
            PredefinedVariables::CI_COMMIT_BRANCH.to_string(),
            "$CI_COMMIT_BRANCH"
        );
        assert_eq!(PredefinedVariables::CI_JOB_NAME.key(), "CI_JOB_NAME");
    }
}
