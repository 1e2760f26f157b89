//! Job and pipeline dependencies
//!
//! Models the [needs](https://docs.gitlab.com/ee/ci/yaml/#needs) keyword.
//! A need either points to a job (optionally in another project) or to
//! another pipeline. Invalid combinations are rejected when the need is
//! built, so a [`Need`] value is always renderable.

#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]

use super::errors::ValidationError;
use super::types::{Render, impl_render_traits};
use super::variables::{PredefinedVariables, ProcessEnv, VariableResolver};
use serde_yaml::{Mapping, Value};

/// Branch used for cross-project needs when no `ref` is given
pub const DEFAULT_REF: &str = "main";

/// A dependency on a job or on another pipeline
#[derive(Debug, Clone)]
pub struct Need {
    job: Option<String>,
    project: Option<String>,
    git_ref: Option<String>,
    pipeline: Option<String>,
    artifacts: bool,
}

impl Need {
    /// Creates a need builder
    pub fn builder() -> NeedBuilder {
        NeedBuilder::new()
    }

    /// Depends on `job` of the current pipeline, downloading its artifacts.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingRequiredReference`] if `job` is empty.
    pub fn for_job(job: impl Into<String>) -> Result<Self, ValidationError> {
        NeedBuilder::new().job(job).build()
    }

    /// Depends on the pipeline identified by `pipeline`.
    ///
    /// # Errors
    ///
    /// Fails if `pipeline` is empty or names the current pipeline.
    pub fn for_pipeline(pipeline: impl Into<String>) -> Result<Self, ValidationError> {
        NeedBuilder::new().pipeline(pipeline).build()
    }

    /// Name of the job to depend on
    pub fn job(&self) -> Option<&str> {
        self.job.as_deref()
    }

    /// Project the job resides in
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// Branch of the remote project. Set to [`DEFAULT_REF`] whenever a
    /// project was given without one.
    pub fn git_ref(&self) -> Option<&str> {
        self.git_ref.as_deref()
    }

    /// Pipeline to depend on
    pub fn pipeline(&self) -> Option<&str> {
        self.pipeline.as_deref()
    }

    /// Whether artifacts of `job` are downloaded
    pub fn artifacts(&self) -> bool {
        self.artifacts
    }
}

impl Render for Need {
    fn render(&self) -> Mapping {
        let mut rendered = Mapping::new();

        if let Some(job) = &self.job {
            rendered.insert(Value::from("job"), Value::from(job.as_str()));
            rendered.insert(Value::from("artifacts"), Value::from(self.artifacts));
        }

        if let (Some(project), Some(git_ref)) = (&self.project, &self.git_ref) {
            rendered.insert(Value::from("project"), Value::from(project.as_str()));
            rendered.insert(Value::from("ref"), Value::from(git_ref.as_str()));
        }

        if let Some(pipeline) = &self.pipeline {
            rendered.insert(Value::from("pipeline"), Value::from(pipeline.as_str()));
        }

        rendered
    }
}

impl_render_traits!(Need);

/// Builder for creating needs
#[derive(Debug, Clone)]
pub struct NeedBuilder {
    job: Option<String>,
    project: Option<String>,
    git_ref: Option<String>,
    pipeline: Option<String>,
    artifacts: bool,
}

impl Default for NeedBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NeedBuilder {
    /// Creates a new need builder
    pub fn new() -> Self {
        Self {
            job: None,
            project: None,
            git_ref: None,
            pipeline: None,
            artifacts: true,
        }
    }

    /// Sets the job to depend on
    pub fn job(mut self, job: impl Into<String>) -> Self {
        self.job = Some(job.into());
        self
    }

    /// Sets the project the job resides in
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Sets the branch of the remote project
    pub fn git_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = Some(git_ref.into());
        self
    }

    /// Sets the `CI_PIPELINE_ID` of another pipeline, or the path of an
    /// upstream project whose pipeline status is mirrored
    pub fn pipeline(mut self, pipeline: impl Into<String>) -> Self {
        self.pipeline = Some(pipeline.into());
        self
    }

    /// Sets whether artifacts of the job are downloaded
    pub fn artifacts(mut self, artifacts: bool) -> Self {
        self.artifacts = artifacts;
        self
    }

    /// Builds the need, comparing `pipeline` against the current pipeline
    /// of the process environment.
    ///
    /// # Errors
    ///
    /// See [`NeedBuilder::build_with`].
    pub fn build(self) -> Result<Need, ValidationError> {
        self.build_with(&ProcessEnv)
    }

    /// Builds the need, reading the current pipeline identifier from `env`.
    ///
    /// Checks run in order and the first violation is returned.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::MissingRequiredReference`] if neither `job` nor
    ///   `pipeline` is set
    /// - [`ValidationError::DanglingRefQualifier`] if `ref` is set without
    ///   `project`
    /// - [`ValidationError::ConflictingReferenceTarget`] if both `project`
    ///   and `pipeline` are set
    /// - [`ValidationError::SelfReferentialPipeline`] if `pipeline` equals
    ///   `CI_PIPELINE_ID`
    /// - [`ValidationError::Environment`] if `CI_PIPELINE_ID` cannot be read
    pub fn build_with<R: VariableResolver + ?Sized>(
        self,
        env: &R,
    ) -> Result<Need, ValidationError> {
        let job = non_empty(self.job);
        let project = non_empty(self.project);
        let git_ref = non_empty(self.git_ref);
        let pipeline = non_empty(self.pipeline);

        let result = validate(
            job.as_deref(),
            project.as_deref(),
            git_ref.as_deref(),
            pipeline.as_deref(),
            env,
        );
        if let Err(ref error) = result {
            tracing::warn!(
                job = ?job,
                pipeline = ?pipeline,
                error = %error,
                "Rejected need"
            );
        }
        result?;

        let git_ref = git_ref.or_else(|| project.as_ref().map(|_| DEFAULT_REF.to_string()));

        tracing::debug!(job = ?job, project = ?project, pipeline = ?pipeline, "Need validated");

        Ok(Need {
            job,
            project,
            git_ref,
            pipeline,
            artifacts: self.artifacts,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn validate<R: VariableResolver + ?Sized>(
    job: Option<&str>,
    project: Option<&str>,
    git_ref: Option<&str>,
    pipeline: Option<&str>,
    env: &R,
) -> Result<(), ValidationError> {
    if job.is_none() && pipeline.is_none() {
        return Err(ValidationError::MissingRequiredReference);
    }

    if git_ref.is_some() && project.is_none() {
        return Err(ValidationError::DanglingRefQualifier);
    }

    if project.is_some() && pipeline.is_some() {
        return Err(ValidationError::ConflictingReferenceTarget);
    }

    if let Some(pipeline) = pipeline {
        if pipeline == PredefinedVariables::CI_PIPELINE_ID.value_in(env)? {
            return Err(ValidationError::SelfReferentialPipeline {
                pipeline: pipeline.to_string(),
            });
        }
    }

    Ok(())
}
