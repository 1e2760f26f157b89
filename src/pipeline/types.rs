//! Core traits for configuration objects
//!
//! Every keyword object renders to a plain YAML mapping. Equality between
//! two objects of the same type is defined on that rendered form rather than
//! on their raw fields, so objects that differ only in how an absent value is
//! stored still compare equal.

use serde_yaml::Mapping;

/// Types that render into a GitLab CI keyword mapping
pub trait Render {
    /// Returns the keyword as a mapping of static values, ready to be dumped
    /// as part of a `.gitlab-ci.yml` document.
    fn render(&self) -> Mapping;

    /// Returns true if both objects render to the same tree.
    ///
    /// `None` never equals anything.
    fn equals(&self, other: Option<&Self>) -> bool {
        other.is_some_and(|other| self.render() == other.render())
    }
}

/// Trait for types that can be validated
#[allow(clippy::missing_errors_doc)]
pub trait Validate {
    /// Type of validation error
    type Error;

    /// Validates this type
    fn validate(&self) -> std::result::Result<(), Self::Error>;
}

/// Implements `PartialEq` and `Serialize` for a [`Render`] type in terms of
/// its rendered mapping.
macro_rules! impl_render_traits {
    ($ty:ty) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                $crate::pipeline::Render::equals(self, Some(other))
            }
        }

        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serde::Serialize::serialize(&$crate::pipeline::Render::render(self), serializer)
            }
        }
    };
}

pub(crate) use impl_render_traits;
