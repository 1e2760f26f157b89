//! Container image references
//!
//! Models the [image](https://docs.gitlab.com/ee/ci/yaml/#image) keyword.

#![allow(clippy::must_use_candidate)]

use super::errors::ValidationError;
use super::types::{Render, Validate, impl_render_traits};
use serde_yaml::{Mapping, Value};
use std::fmt;

/// A Docker image used by a job.
///
/// Images are typically defined once and shared. Instead of altering a shared
/// instance, derive a variant with [`Image::with_tag`] or
/// [`Image::with_entrypoint`]; both leave the original untouched.
#[derive(Debug, Clone)]
pub struct Image {
    name: String,
    tag: Option<String>,
    entrypoint: Option<Vec<String>>,
}

impl Image {
    /// Creates an image reference.
    ///
    /// `name` may already contain a registry path and a tag.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: None,
            entrypoint: None,
        }
    }

    /// Returns a copy of this image with `tag` as its tag
    pub fn with_tag(&self, tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..self.clone()
        }
    }

    /// Returns a copy of this image with its entrypoint overridden.
    ///
    /// An empty `entrypoint` is kept as an explicit empty override.
    pub fn with_entrypoint<I, S>(&self, entrypoint: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entrypoint: Some(entrypoint.into_iter().map(Into::into).collect()),
            ..self.clone()
        }
    }

    /// Image name as given at construction
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag appended to the name when rendered
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Entrypoint override
    pub fn entrypoint(&self) -> Option<&[String]> {
        self.entrypoint.as_deref()
    }
}

impl Render for Image {
    fn render(&self) -> Mapping {
        let mut rendered = Mapping::new();

        let name = match self.tag.as_deref() {
            Some(tag) if !tag.is_empty() => format!("{}:{tag}", self.name),
            _ => self.name.clone(),
        };
        rendered.insert(Value::from("name"), Value::from(name));

        if let Some(entrypoint) = self.entrypoint.as_ref().filter(|e| !e.is_empty()) {
            rendered.insert(
                Value::from("entrypoint"),
                Value::Sequence(entrypoint.iter().cloned().map(Value::from).collect()),
            );
        }

        rendered
    }
}

impl_render_traits!(Image);

impl Validate for Image {
    type Error = ValidationError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyImageName);
        }
        Ok(())
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag.as_deref() {
            Some(tag) if !tag.is_empty() => write!(f, "{}:{tag}", self.name),
            _ => write!(f, "{}", self.name),
        }
    }
}
