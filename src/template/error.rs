//! Field-level error types for placeholder parsing and substitution.
//!
//! Errors at this level never abort a tree walk. They are accumulated per
//! field and surfaced together once the walk has completed; only a backend
//! failure (which leaves the engine with no secret map at all) is fatal to a
//! resource.

use std::fmt;
use thiserror::Error;

/// Malformed placeholder or modifier syntax inside one string scalar.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid placeholder: {0}")]
pub struct ParseError(pub String);

/// Failure while applying one modifier in a chain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModifierError {
    /// The modifier name is not registered.
    #[error("unknown modifier '{0}'")]
    Unknown(String),

    /// The modifier was invoked with the wrong number of parameters.
    #[error("modifier '{name}' expects {expected} parameter(s), got {got}")]
    Arity { name: &'static str, expected: usize, got: usize },

    /// The modifier cannot operate on the shape of value it received.
    #[error("modifier '{name}' expects {expected} input")]
    InputShape { name: &'static str, expected: &'static str },

    /// Modifier-internal failure; carries the underlying cause verbatim.
    #[error("modifier '{name}' failed: {message}")]
    Failed { name: &'static str, message: String },
}

impl ModifierError {
    pub(crate) fn failed(name: &'static str, message: impl Into<String>) -> Self {
        Self::Failed { name, message: message.into() }
    }
}

/// What went wrong for one field during substitution.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplacementErrorKind {
    /// Placeholder or modifier syntax could not be parsed.
    Parse(ParseError),
    /// The secret key was absent from the resource's secret map.
    UnresolvedKey { key: String },
    /// A modifier chain failed part-way through.
    Modifier(ModifierError),
}

/// An accumulated substitution failure: the field path, the offending
/// key/modifier, and a human-readable cause.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplacementError {
    /// Dotted field path with sequence indices, e.g.
    /// `spec.template.spec.containers[0].env[1].value`.
    pub path: String,
    pub kind: ReplacementErrorKind,
}

impl ReplacementError {
    pub fn parse(path: impl Into<String>, err: ParseError) -> Self {
        Self { path: path.into(), kind: ReplacementErrorKind::Parse(err) }
    }

    pub fn unresolved(path: impl Into<String>, key: impl Into<String>) -> Self {
        Self { path: path.into(), kind: ReplacementErrorKind::UnresolvedKey { key: key.into() } }
    }

    pub fn modifier(path: impl Into<String>, err: ModifierError) -> Self {
        Self { path: path.into(), kind: ReplacementErrorKind::Modifier(err) }
    }
}

impl fmt::Display for ReplacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ReplacementErrorKind::Parse(e) => write!(f, "{}: {}", self.path, e),
            ReplacementErrorKind::UnresolvedKey { key } => {
                write!(f, "{}: unresolved secret key '{}'", self.path, key)
            }
            ReplacementErrorKind::Modifier(e) => write!(f, "{}: {}", self.path, e),
        }
    }
}

impl std::error::Error for ReplacementError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_display() {
        let err = ReplacementError::unresolved("spec.password", "db-password");
        assert_eq!(err.to_string(), "spec.password: unresolved secret key 'db-password'");
    }

    #[test]
    fn test_modifier_display() {
        let err = ReplacementError::modifier(
            "data.config",
            ModifierError::Arity { name: "indent", expected: 1, got: 0 },
        );
        assert!(err.to_string().contains("data.config"));
        assert!(err.to_string().contains("expects 1 parameter(s)"));
    }

    #[test]
    fn test_parse_display() {
        let err = ReplacementError::parse("data.x", ParseError("empty secret key".into()));
        assert!(err.to_string().contains("invalid placeholder"));
    }
}
