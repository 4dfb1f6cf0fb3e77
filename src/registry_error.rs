use thiserror::Error;

/// Boxed error returned by a [`SingletonFactory`](crate::SingletonFactory).
pub type FactoryError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by [`SingletonRegistry`](crate::SingletonRegistry).
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The factory could not produce an instance for `name`.
    ///
    /// Nothing is cached; the next call for the same pair retries.
    #[error("failed to create singleton '{name}': {source}")]
    CreationFailed {
        name: String,
        #[source]
        source: FactoryError,
    },

    #[error("symbolic name must not be empty")]
    InvalidName,

    /// The cached instance for `name` is not a `expected`.
    #[error("singleton '{name}' is not of type {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
    },
}
