use async_trait::async_trait;

use crate::{
    error::{ConnectError, SendError, ShutdownError},
    state::{ChannelState, StatusCell},
    types::{ChannelType, OutboundMessage},
};

/// Capability contract every channel backend satisfies.
///
/// The orchestrator owns lifecycle and retry; backends own their
/// connection/session and translate backend-specific failures into the
/// shared taxonomy. Constructing a backend must be side-effect free: no
/// network, no instantiation of unrelated backends. All I/O happens inside
/// `connect`/`send`/`shutdown`.
#[async_trait]
pub trait ChannelBackend: Send + Sync {
    /// Which registry key this backend answers to.
    fn channel_type(&self) -> ChannelType;

    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// The backend's state cell. The orchestrator drives send-outcome
    /// transitions (`Ready ⇄ Degraded`, demotion to `Failed`) through this;
    /// the backend drives connect/shutdown transitions itself.
    fn status_cell(&self) -> &StatusCell;

    /// Current state. Never fails, never blocks on I/O.
    fn status(&self) -> ChannelState {
        self.status_cell().get()
    }

    /// Establish the connection/session. Drives the cell through
    /// `Connecting → Ready` on success; leaves state for the orchestrator
    /// to demote on failure.
    async fn connect(&self) -> Result<(), ConnectError>;

    /// Send one message, returning the backend-assigned message ID.
    ///
    /// Must be safe to call while `Degraded` (best-effort). Backends do not
    /// retry internally — the orchestrator owns the retry budget.
    async fn send(&self, message: &OutboundMessage) -> Result<String, SendError>;

    /// Tear the session down. Drives the cell to `Shutdown` regardless of
    /// whether the teardown itself succeeded.
    async fn shutdown(&self) -> Result<(), ShutdownError>;
}
