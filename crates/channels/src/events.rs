use {
    async_trait::async_trait,
    tracing::{info, warn},
};

use crate::state::ChannelState;

/// Structured events emitted by the orchestrator for observability.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChannelEvent {
    /// A channel moved to a new state.
    StatusChanged {
        channel_type: String,
        from: ChannelState,
        to: ChannelState,
    },
    /// A dispatch completed, successfully or not.
    DispatchOutcome {
        channel_type: String,
        attempts: u32,
        delivered: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

/// Sink for channel events. The embedding application provides the concrete
/// implementation; the core never hardcodes a logging destination.
#[async_trait]
pub trait ChannelEventSink: Send + Sync {
    async fn emit(&self, event: ChannelEvent);
}

/// Default sink: forward events to `tracing`.
pub struct TracingEventSink;

#[async_trait]
impl ChannelEventSink for TracingEventSink {
    async fn emit(&self, event: ChannelEvent) {
        match &event {
            ChannelEvent::StatusChanged {
                channel_type,
                from,
                to,
            } => {
                info!(channel = %channel_type, %from, %to, "channel status changed");
            },
            ChannelEvent::DispatchOutcome {
                channel_type,
                attempts,
                delivered,
                error,
            } => {
                if *delivered {
                    info!(channel = %channel_type, attempts, "message delivered");
                } else {
                    warn!(
                        channel = %channel_type,
                        attempts,
                        error = error.as_deref().unwrap_or("unknown"),
                        "dispatch failed"
                    );
                }
            },
        }
    }
}
