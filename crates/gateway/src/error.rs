use nestor_channels::{ChannelState, ChannelType, ConnectError, SendError};

pub type Result<T> = std::result::Result<T, DispatchError>;

/// Orchestration-level dispatch failures.
///
/// Every variant names the channel involved; retry-related variants also
/// carry the attempt count, so a failed dispatch is never silent about what
/// was tried.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No configuration exists for this channel type.
    #[error("channel {channel_type} is not configured")]
    UnknownChannel { channel_type: ChannelType },

    /// The channel is configured but switched off.
    #[error("channel {channel_type} is disabled")]
    Disabled { channel_type: ChannelType },

    /// The backend factory rejected the configuration. Deployment error,
    /// surfaced immediately and never retried.
    #[error("invalid config for channel {channel_type}: {message}")]
    InvalidConfig {
        channel_type: ChannelType,
        message: String,
    },

    /// The channel is in a state that forbids dispatch (`Failed`,
    /// `Shutdown`). No connect or send is attempted.
    #[error("channel {channel_type} unavailable (state: {state})")]
    ChannelUnavailable {
        channel_type: ChannelType,
        state: ChannelState,
    },

    /// Connecting failed after the configured attempt budget.
    #[error("connect to {channel_type} failed after {attempts} attempt(s): {last}")]
    ConnectFailed {
        channel_type: ChannelType,
        attempts: u32,
        #[source]
        last: ConnectError,
    },

    /// Transient send failures exhausted the retry budget.
    #[error("dispatch to {channel_type} failed after {attempts} attempt(s): {last}")]
    RetriesExhausted {
        channel_type: ChannelType,
        attempts: u32,
        #[source]
        last: SendError,
    },

    /// The backend rejected the message permanently; retrying cannot help.
    #[error("channel {channel_type} rejected the message (attempt {attempts}): {last}")]
    Rejected {
        channel_type: ChannelType,
        attempts: u32,
        #[source]
        last: SendError,
    },

    /// Registry-level failure (invalid key, missing slot).
    #[error(transparent)]
    Registry(#[from] nestor_registry::Error),
}

impl DispatchError {
    /// Attempt count carried by this error, if any.
    #[must_use]
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::ConnectFailed { attempts, .. }
            | Self::RetriesExhausted { attempts, .. }
            | Self::Rejected { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }
}
