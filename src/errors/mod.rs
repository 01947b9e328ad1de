//! # Error Handling
//!
//! Crate-wide error types for secretweave, defined with `thiserror`.
//!
//! Field-level substitution failures are accumulated separately as
//! [`crate::template::ReplacementError`] values during a tree walk; they only
//! become a [`SecretweaveError::Substitution`] once the walk has finished and
//! the resource surfaces them as a single aggregate failure.

use thiserror::Error;

/// Custom result type for secretweave operations.
pub type Result<T> = std::result::Result<T, SecretweaveError>;

/// Main error type for secretweave.
#[derive(Error, Debug)]
pub enum SecretweaveError {
    /// Configuration errors.
    #[error("configuration error: {0}")]
    Config(String),

    /// Annotation or policy evaluation errors.
    #[error("policy error: {0}")]
    Policy(String),

    /// Authentication with a secret backend failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A secret path does not exist or holds no keys.
    #[error("no secrets found at path '{path}': {reason}")]
    PathNotFound { path: String, reason: String },

    /// Backend-specific fetch failure.
    #[error("backend error: {0}")]
    Backend(String),

    /// Aggregate substitution failure for one resource.
    #[error("substitution failed for {resource}: {details}")]
    Substitution { resource: String, details: String },

    /// A resource operation was invoked in the wrong lifecycle state.
    #[error("invalid resource state: {0}")]
    State(String),

    /// Manifest (de)serialization errors.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SecretweaveError {
    /// Create a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new policy error.
    pub fn policy<S: Into<String>>(message: S) -> Self {
        Self::Policy(message.into())
    }

    /// Create a new authentication error.
    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Auth(message.into())
    }

    /// Create an error for a missing or empty secret path.
    pub fn path_not_found<P: Into<String>, R: Into<String>>(path: P, reason: R) -> Self {
        Self::PathNotFound { path: path.into(), reason: reason.into() }
    }

    /// Create a new backend error.
    pub fn backend<S: Into<String>>(message: S) -> Self {
        Self::Backend(message.into())
    }

    /// Create a new resource state error.
    pub fn state<S: Into<String>>(message: S) -> Self {
        Self::State(message.into())
    }
}

impl From<validator::ValidationErrors> for SecretweaveError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Config(errors.to_string())
    }
}
