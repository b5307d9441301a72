use thiserror::Error as ThisError;

/// Crate-wide result type for registry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed registry errors.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Key is empty or contains whitespace/control characters.
    #[error("invalid registry key: {key:?}")]
    InvalidKey { key: String },

    /// No entry is registered under the requested key.
    #[error("registry key not found: {key}")]
    NotFound { key: String },
}

impl Error {
    #[must_use]
    pub fn invalid_key(key: impl Into<String>) -> Self {
        Self::InvalidKey { key: key.into() }
    }

    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }
}
