use std::error::Error as StdError;

/// Failure while establishing a backend connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// Credentials were rejected or missing.
    #[error("channel authentication failed: {message}")]
    Auth { message: String },

    /// The backend could not be reached; retryable.
    #[error("channel connect failed: {message}")]
    Network { message: String },

    /// The backend configuration is incomplete or malformed. Never retried.
    #[error("invalid channel config: {message}")]
    InvalidConfig { message: String },

    /// Wrapped source error from an external dependency.
    #[error("channel connect failed: {context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl ConnectError {
    #[must_use]
    pub fn auth(message: impl std::fmt::Display) -> Self {
        Self::Auth {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn network(message: impl std::fmt::Display) -> Self {
        Self::Network {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn invalid_config(message: impl std::fmt::Display) -> Self {
        Self::InvalidConfig {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Whether another connect attempt may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::External { .. })
    }
}

/// Failure while sending a message.
///
/// The transient/permanent split drives the orchestrator's retry decision:
/// transient failures are retried up to policy limits, permanent ones are
/// surfaced immediately.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// Likely to succeed on retry (rate limit, network blip, 5xx).
    #[error("transient send failure: {message}")]
    Transient { message: String },

    /// Retrying cannot help (rejected recipient, oversized payload, 4xx).
    #[error("permanent send failure: {message}")]
    Permanent { message: String },
}

impl SendError {
    #[must_use]
    pub fn transient(message: impl std::fmt::Display) -> Self {
        Self::Transient {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn permanent(message: impl std::fmt::Display) -> Self {
        Self::Permanent {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// Failure while tearing a backend down.
#[derive(Debug, thiserror::Error)]
#[error("channel shutdown failed: {message}")]
pub struct ShutdownError {
    pub message: String,
}

impl ShutdownError {
    #[must_use]
    pub fn new(message: impl std::fmt::Display) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_error_classification() {
        assert!(SendError::transient("429").is_transient());
        assert!(!SendError::permanent("bad recipient").is_transient());
    }

    #[test]
    fn connect_error_classification() {
        assert!(ConnectError::network("timeout").is_transient());
        assert!(!ConnectError::auth("bad token").is_transient());
        assert!(!ConnectError::invalid_config("missing token").is_transient());
    }
}
