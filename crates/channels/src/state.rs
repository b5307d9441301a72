use {
    serde::{Deserialize, Serialize},
    std::sync::RwLock,
    tracing::debug,
};

/// Connection state of a channel backend.
///
/// Exactly one state is current per channel. Transitions are monotonic within
/// a connection attempt: `Uninitialized → Connecting → Ready`, with
/// `Ready ⇄ Degraded` oscillation on transient send outcomes, `Failed` on
/// unrecoverable error, and `Shutdown` terminal. A `Failed` channel is only
/// revived by explicit reinitialization ([`StatusCell::reset`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelState {
    Uninitialized,
    Connecting,
    Ready,
    Degraded,
    Failed,
    Shutdown,
}

impl ChannelState {
    /// Whether dispatch may still be attempted in this state.
    ///
    /// `Degraded` stays dispatchable (best-effort); `Failed` and `Shutdown`
    /// fail immediately without touching the backend.
    #[must_use]
    pub fn is_dispatchable(&self) -> bool {
        !matches!(self, Self::Failed | Self::Shutdown)
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Shutdown)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Connecting => "connecting",
            Self::Ready => "ready",
            Self::Degraded => "degraded",
            Self::Failed => "failed",
            Self::Shutdown => "shutdown",
        }
    }
}

impl std::fmt::Display for ChannelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared, lock-protected channel state with an enforced transition table.
///
/// Reading never fails and never blocks on I/O. Illegal transitions are
/// dropped (and logged) rather than surfaced — `status()` consumers must
/// never observe a torn or out-of-order state.
#[derive(Debug)]
pub struct StatusCell {
    state: RwLock<ChannelState>,
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusCell {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ChannelState::Uninitialized),
        }
    }

    /// Current state. Infallible.
    #[must_use]
    pub fn get(&self) -> ChannelState {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Attempt the transition to `to`.
    ///
    /// Returns the previous state when the transition was legal and applied,
    /// `None` when it was ignored.
    pub fn advance(&self, to: ChannelState) -> Option<ChannelState> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let from = *state;
        if !transition_allowed(from, to) {
            if from != to {
                debug!(%from, %to, "ignoring illegal channel state transition");
            }
            return None;
        }
        *state = to;
        Some(from)
    }

    /// Explicit reinitialization: back to `Uninitialized` from any state.
    ///
    /// This is the only way out of `Failed`, and the only non-monotonic
    /// transition in the lifecycle.
    pub fn reset(&self) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        *state = ChannelState::Uninitialized;
    }
}

fn transition_allowed(from: ChannelState, to: ChannelState) -> bool {
    use ChannelState::*;
    if from == to {
        return false;
    }
    match (from, to) {
        // Shutdown is terminal.
        (Shutdown, _) => false,
        (_, Shutdown) => true,
        // Failed is only left via reset() or shutdown.
        (Failed, _) => false,
        (_, Failed) => true,
        (Uninitialized, Connecting) => true,
        (Connecting, Ready) => true,
        (Ready, Degraded) | (Degraded, Ready) => true,
        _ => false,
    }
}
