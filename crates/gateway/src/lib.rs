//! Channel orchestration.
//!
//! [`ChannelOrchestrator`] owns the registry of active channel backends:
//! lazy factory-based construction, per-dispatch retry with exponential
//! backoff, per-channel state tracking, health aggregation, and collective
//! shutdown. Backends stay independent — one channel failing never blocks
//! dispatches to another.

pub mod config;
pub mod error;
pub mod orchestrator;

pub use {
    config::ChannelConfig,
    error::{DispatchError, Result},
    orchestrator::{BackendFactory, ChannelOrchestrator},
};
