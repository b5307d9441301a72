//! Channel backend abstraction.
//!
//! Each messaging backend (Telegram, email) implements the [`ChannelBackend`]
//! trait. The orchestrator in `nestor-gateway` never inspects a concrete
//! backend type — it looks backends up by [`ChannelType`] and talks to them
//! through the capability trait alone. Backend construction is deferred until
//! first use and must never touch the network by itself.

pub mod allowlist;
pub mod backend;
pub mod error;
pub mod events;
pub mod retry;
pub mod state;
pub mod types;

pub use {
    backend::ChannelBackend,
    error::{ConnectError, SendError, ShutdownError},
    events::{ChannelEvent, ChannelEventSink, TracingEventSink},
    retry::RetryPolicy,
    state::{ChannelState, StatusCell},
    types::{ChannelType, DeliveryReceipt, OutboundMessage},
};
