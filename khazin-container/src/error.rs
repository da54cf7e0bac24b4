//! Error types for Khazin container operations.
//!
//! Every error names the binding involved and, where it helps,
//! what asked for it and what the caller probably meant.

use std::fmt;
use std::path::PathBuf;

use khazin_support::rendering::{render_chain, shorten_type_name};

use crate::key::DependencyKey;

/// Main error type for all container operations.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// Requested (or transitively required) name has no binding.
    #[error("{}", .0)]
    NotFound(NotFoundError),

    /// `register`/`singleton` called twice for the same normalized name.
    #[error("{}", .0)]
    DuplicateBinding(DuplicateBindingError),

    /// A resolution path came back to a binding it was still building.
    #[error("{}", .0)]
    CyclicDependency(CyclicDependencyError),

    /// The binding exists but produces a value of another type.
    #[error(
        "Type mismatch for {name}: requested {}, binding produces {}",
        shorten_type_name(.expected),
        shorten_type_name(.found)
    )]
    TypeMismatch {
        name: DependencyKey,
        expected: &'static str,
        found: &'static str,
    },

    /// A constructor or factory returned an error.
    #[error("Failed to construct {name}: {source}")]
    ConstructionFailed {
        name: DependencyKey,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Discovery could not read the source tree.
    #[error("Failed to discover types under {}: {source}", .path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ContainerError {
    /// Wraps any error raised while building `name`.
    pub fn construction(
        name: impl Into<DependencyKey>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        ContainerError::ConstructionFailed {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Returns `true` for [`ContainerError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContainerError::NotFound(_))
    }
}

/// Error when a name has no binding.
#[derive(Debug)]
pub struct NotFoundError {
    /// The name that was requested
    pub requested: DependencyKey,
    /// The binding whose constructor needed it, if any
    pub required_by: Option<DependencyKey>,
    /// Registered names that look similar
    pub suggestions: Vec<String>,
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Couldn't find dependency {} in the container", self.requested)?;

        if let Some(ref parent) = self.required_by {
            write!(f, "\n  Required by: {parent}")?;
        }

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        write!(
            f,
            "\n  Hint: register or bind {:?} before requesting it",
            self.requested.spelling()
        )
    }
}

/// Error when a strict registration collides with an existing one.
#[derive(Debug)]
pub struct DuplicateBindingError {
    pub name: DependencyKey,
}

impl fmt::Display for DuplicateBindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dependency already registered: {}", self.name)?;
        write!(
            f,
            "\n  Hint: use .bind() to replace a binding, or build the container with allow_override(true)"
        )
    }
}

/// Error when resolution loops back on itself.
///
/// The chain starts and ends with the same binding.
#[derive(Debug)]
pub struct CyclicDependencyError {
    pub chain: Vec<DependencyKey>,
}

impl fmt::Display for CyclicDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.chain.iter().map(DependencyKey::spelling).collect();
        write!(f, "Circular dependency detected:\n  {}", render_chain(&names))?;
        write!(
            f,
            "\n  Hint: break the loop with a factory binding that resolves one side lazily"
        )
    }
}

/// Convenient Result type for container operations.
pub type Result<T> = std::result::Result<T, ContainerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_error_display() {
        let err = ContainerError::NotFound(NotFoundError {
            requested: DependencyKey::new("OrderRepository"),
            required_by: Some(DependencyKey::new("OrderService")),
            suggestions: vec!["userrepository".into()],
        });

        let msg = err.to_string();
        assert!(msg.contains("Couldn't find dependency OrderRepository"));
        assert!(msg.contains("Required by: OrderService"));
        assert!(msg.contains("- userrepository"));
        assert!(err.is_not_found());
    }

    #[test]
    fn cyclic_dependency_error_display() {
        let err = ContainerError::CyclicDependency(CyclicDependencyError {
            chain: vec![
                DependencyKey::new("a"),
                DependencyKey::new("b"),
                DependencyKey::new("a"),
            ],
        });

        let msg = err.to_string();
        assert!(msg.contains("Circular"));
        assert!(msg.contains("a → b → a"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn duplicate_binding_error_display() {
        let err = ContainerError::DuplicateBinding(DuplicateBindingError {
            name: DependencyKey::new("clock"),
        });
        assert!(err.to_string().contains("already registered: clock"));
    }

    #[test]
    fn type_mismatch_shortens_names() {
        let err = ContainerError::TypeMismatch {
            name: DependencyKey::new("clock"),
            expected: "alloc::string::String",
            found: "app::Clock",
        };
        assert_eq!(
            err.to_string(),
            "Type mismatch for clock: requested String, binding produces Clock"
        );
    }

    #[test]
    fn construction_wraps_source() {
        let err = ContainerError::construction("Manual", "boom");
        assert_eq!(err.to_string(), "Failed to construct Manual (manual): boom");
        assert!(std::error::Error::source(&err).is_some());
    }
}
