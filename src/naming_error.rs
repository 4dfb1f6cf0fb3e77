use thiserror::Error;

/// Errors produced by [`NamingDirectory`](crate::NamingDirectory).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    /// Nothing is bound at `path`, or the path runs through a binding.
    #[error("name not found: {path}")]
    NotFound { path: String },

    /// `segment` of `path` is occupied by a node of the wrong kind.
    #[error("structural conflict binding '{path}': '{segment}' is already bound")]
    StructuralConflict { path: String, segment: String },

    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("object bound at '{path}' is not of type {expected}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
    },
}
