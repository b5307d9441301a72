use nestor_channels::{ChannelType, RetryPolicy};

/// Immutable configuration bundle for one channel.
///
/// Owned by the orchestrator and never mutated after construction — hot
/// reconfiguration replaces the bundle (via
/// [`reinitialize`](crate::ChannelOrchestrator::reinitialize) plus a new
/// orchestrator or config swap), it does not edit in place.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub channel_type: ChannelType,
    /// Backend-specific configuration payload, passed verbatim to the
    /// backend factory.
    pub backend: serde_json::Value,
    pub retry: RetryPolicy,
    pub enabled: bool,
}

impl ChannelConfig {
    #[must_use]
    pub fn new(channel_type: ChannelType, backend: serde_json::Value) -> Self {
        Self {
            channel_type,
            backend,
            retry: RetryPolicy::default(),
            enabled: true,
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}
