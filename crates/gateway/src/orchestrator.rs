use std::{collections::HashMap, sync::Arc};

use {
    tokio::sync::OnceCell,
    tracing::{debug, info, warn},
};

use {
    nestor_channels::{
        ChannelBackend, ChannelEvent, ChannelEventSink, ChannelState, ChannelType, ConnectError,
        DeliveryReceipt, OutboundMessage, RetryPolicy, ShutdownError,
    },
    nestor_common::unix_now,
    nestor_email::EmailBackend,
    nestor_registry::{OverwritePolicy, Registry},
    nestor_telegram::TelegramBackend,
};

use crate::{
    config::ChannelConfig,
    error::{DispatchError, Result},
};

/// Deferred backend constructor, invoked on first use of a channel type.
///
/// Factories take the backend-specific config payload and must not perform
/// network I/O — connection happens lazily through `connect`.
pub type BackendFactory = Box<
    dyn Fn(&serde_json::Value) -> std::result::Result<Arc<dyn ChannelBackend>, ConnectError>
        + Send
        + Sync,
>;

/// One registry slot per channel type. The `OnceCell` guarantees exactly one
/// backend instance per type even under concurrent `get_or_create`, and
/// construction runs outside the registry's lock.
type Slot = Arc<OnceCell<Arc<dyn ChannelBackend>>>;

/// Coordinates channel lifecycle, dispatch, retries, and health.
pub struct ChannelOrchestrator {
    configs: HashMap<ChannelType, ChannelConfig>,
    factories: HashMap<ChannelType, BackendFactory>,
    slots: Registry<Slot>,
    event_sink: Option<Arc<dyn ChannelEventSink>>,
}

impl ChannelOrchestrator {
    /// Build an orchestrator over the given immutable channel configs.
    /// Factories are registered separately; see
    /// [`with_default_factories`](Self::with_default_factories).
    #[must_use]
    pub fn new(configs: impl IntoIterator<Item = ChannelConfig>) -> Self {
        Self {
            configs: configs
                .into_iter()
                .map(|c| (c.channel_type, c))
                .collect(),
            factories: HashMap::new(),
            slots: Registry::new(),
            event_sink: None,
        }
    }

    /// Register a backend factory for a channel type.
    #[must_use]
    pub fn with_factory(mut self, channel_type: ChannelType, factory: BackendFactory) -> Self {
        self.factories.insert(channel_type, factory);
        self
    }

    /// Register the built-in Telegram and email factories.
    #[must_use]
    pub fn with_default_factories(self) -> Self {
        self.with_factory(
            ChannelType::Telegram,
            Box::new(|payload| {
                let config = serde_json::from_value(payload.clone())
                    .map_err(|e| ConnectError::invalid_config(format!("telegram config: {e}")))?;
                Ok(Arc::new(TelegramBackend::new(config)?) as Arc<dyn ChannelBackend>)
            }),
        )
        .with_factory(
            ChannelType::Email,
            Box::new(|payload| {
                let config = serde_json::from_value(payload.clone())
                    .map_err(|e| ConnectError::invalid_config(format!("email config: {e}")))?;
                Ok(Arc::new(EmailBackend::new(config)?) as Arc<dyn ChannelBackend>)
            }),
        )
    }

    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn ChannelEventSink>) -> Self {
        self.event_sink = Some(sink);
        self
    }

    /// Channel types this orchestrator knows about, enabled or not.
    #[must_use]
    pub fn channel_types(&self) -> Vec<ChannelType> {
        let mut types: Vec<ChannelType> = self.configs.keys().copied().collect();
        types.sort_by_key(|t| t.as_str());
        types
    }

    fn config_for(&self, channel_type: ChannelType) -> Result<&ChannelConfig> {
        let config = self
            .configs
            .get(&channel_type)
            .ok_or(DispatchError::UnknownChannel { channel_type })?;
        if !config.enabled {
            return Err(DispatchError::Disabled { channel_type });
        }
        Ok(config)
    }

    /// Lazily construct and register the backend for `channel_type`.
    ///
    /// Idempotent: repeated and concurrent calls converge on the same
    /// instance. The factory runs outside any registry lock; the instance is
    /// published only after construction completes.
    pub async fn get_or_create(&self, channel_type: ChannelType) -> Result<Arc<dyn ChannelBackend>> {
        let config = self.config_for(channel_type)?;
        let slot = self.slot_for(channel_type)?;

        let backend = slot
            .get_or_try_init(|| async {
                let factory = self.factories.get(&channel_type).ok_or_else(|| {
                    DispatchError::InvalidConfig {
                        channel_type,
                        message: "no backend factory registered".into(),
                    }
                })?;
                info!(channel = %channel_type, "constructing channel backend");
                factory(&config.backend).map_err(|e| DispatchError::InvalidConfig {
                    channel_type,
                    message: e.to_string(),
                })
            })
            .await?;
        Ok(Arc::clone(backend))
    }

    /// Fetch (or publish) the `OnceCell` slot for a channel type. Uses
    /// `KeepExisting` so concurrent callers agree on one canonical cell.
    fn slot_for(&self, channel_type: ChannelType) -> Result<Slot> {
        let key = channel_type.as_str();
        if let Ok(entry) = self.slots.get(key) {
            return Ok(entry.value);
        }
        self.slots.register(
            key,
            Arc::new(OnceCell::new()),
            OverwritePolicy::KeepExisting,
        )?;
        Ok(self.slots.get(key)?.value)
    }

    /// Route one message to a channel, applying the channel's retry policy.
    ///
    /// Returns a delivery receipt or a typed failure naming the channel and
    /// the attempts made. Retries apply to this dispatch only; they never
    /// carry over to other messages.
    pub async fn dispatch(
        &self,
        channel_type: ChannelType,
        message: &OutboundMessage,
    ) -> Result<DeliveryReceipt> {
        let retry = self.config_for(channel_type)?.retry;
        let backend = self.get_or_create(channel_type).await?;

        let state = backend.status();
        if !state.is_dispatchable() {
            self.emit_outcome(channel_type, 0, false, Some(format!("channel {state}")))
                .await;
            return Err(DispatchError::ChannelUnavailable {
                channel_type,
                state,
            });
        }

        if matches!(
            state,
            ChannelState::Uninitialized | ChannelState::Connecting
        ) && let Err(err) = self.connect_with_retry(&backend, &retry).await
        {
            self.emit_outcome(channel_type, 0, false, Some(err.to_string()))
                .await;
            return Err(err);
        }

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match backend.send(message).await {
                Ok(message_id) => {
                    // Promote a degraded channel back on success.
                    self.advance_and_emit(&backend, ChannelState::Ready).await;
                    self.emit_outcome(channel_type, attempt, true, None).await;
                    return Ok(DeliveryReceipt {
                        channel_type,
                        message_id,
                        attempts: attempt,
                        delivered_at: unix_now(),
                    });
                },
                Err(err) if err.is_transient() => {
                    self.advance_and_emit(&backend, ChannelState::Degraded).await;
                    if retry.is_exhausted(attempt) {
                        self.advance_and_emit(&backend, ChannelState::Failed).await;
                        self.emit_outcome(channel_type, attempt, false, Some(err.to_string()))
                            .await;
                        return Err(DispatchError::RetriesExhausted {
                            channel_type,
                            attempts: attempt,
                            last: err,
                        });
                    }
                    let delay = retry.delay_for(attempt);
                    warn!(
                        channel = %channel_type,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient send failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                },
                Err(err) => {
                    // Permanent rejection of this message; the channel itself
                    // stays usable for other messages.
                    self.emit_outcome(channel_type, attempt, false, Some(err.to_string()))
                        .await;
                    return Err(DispatchError::Rejected {
                        channel_type,
                        attempts: attempt,
                        last: err,
                    });
                },
            }
        }
    }

    /// Drive `connect` with the channel's retry budget. Exhaustion (or a
    /// non-retryable connect error) demotes the channel to `Failed`.
    async fn connect_with_retry(
        &self,
        backend: &Arc<dyn ChannelBackend>,
        retry: &RetryPolicy,
    ) -> Result<()> {
        let channel_type = backend.channel_type();
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let before = backend.status();
            match backend.connect().await {
                Ok(()) => {
                    let after = backend.status();
                    if before != after {
                        self.emit(ChannelEvent::StatusChanged {
                            channel_type: channel_type.as_str().into(),
                            from: before,
                            to: after,
                        })
                        .await;
                    }
                    return Ok(());
                },
                Err(err) if err.is_transient() && !retry.is_exhausted(attempt) => {
                    let delay = retry.delay_for(attempt);
                    warn!(
                        channel = %channel_type,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "connect failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                },
                Err(err) => {
                    self.advance_and_emit(backend, ChannelState::Failed).await;
                    return Err(DispatchError::ConnectFailed {
                        channel_type,
                        attempts: attempt,
                        last: err,
                    });
                },
            }
        }
    }

    /// Immutable snapshot of every configured channel's state.
    ///
    /// Channels that have never been instantiated report `Uninitialized`.
    /// Reads state cells only — never blocks on backend I/O and never
    /// constructs a backend.
    #[must_use]
    pub fn health(&self) -> HashMap<ChannelType, ChannelState> {
        self.configs
            .keys()
            .map(|&channel_type| {
                let state = self
                    .slots
                    .get(channel_type.as_str())
                    .ok()
                    .and_then(|entry| entry.value.get().map(|b| b.status()))
                    .unwrap_or(ChannelState::Uninitialized);
                (channel_type, state)
            })
            .collect()
    }

    /// Shut down every instantiated backend, collecting per-channel results
    /// instead of aborting on the first failure.
    pub async fn shutdown_all(
        &self,
    ) -> Vec<(ChannelType, std::result::Result<(), ShutdownError>)> {
        let mut results = Vec::new();
        for channel_type in self.channel_types() {
            let Ok(entry) = self.slots.get(channel_type.as_str()) else {
                continue;
            };
            let Some(backend) = entry.value.get() else {
                continue;
            };
            let before = backend.status();
            let result = backend.shutdown().await;
            if let Err(err) = &result {
                warn!(channel = %channel_type, error = %err, "backend shutdown failed");
            }
            let after = backend.status();
            if before != after {
                self.emit(ChannelEvent::StatusChanged {
                    channel_type: channel_type.as_str().into(),
                    from: before,
                    to: after,
                })
                .await;
            }
            results.push((channel_type, result));
        }
        results
    }

    /// Explicitly tear down one channel's backend so the next use rebuilds
    /// it from scratch. This is the only way back from `Failed`.
    pub fn reinitialize(&self, channel_type: ChannelType) -> Result<()> {
        // Reject unknown types but allow reinit of disabled channels.
        if !self.configs.contains_key(&channel_type) {
            return Err(DispatchError::UnknownChannel { channel_type });
        }
        if self.slots.remove(channel_type.as_str()).is_some() {
            info!(channel = %channel_type, "channel backend dropped for reinitialization");
        }
        Ok(())
    }

    async fn advance_and_emit(&self, backend: &Arc<dyn ChannelBackend>, to: ChannelState) {
        if let Some(from) = backend.status_cell().advance(to) {
            debug!(channel = %backend.channel_type(), %from, %to, "channel state changed");
            self.emit(ChannelEvent::StatusChanged {
                channel_type: backend.channel_type().as_str().into(),
                from,
                to,
            })
            .await;
        }
    }

    async fn emit_outcome(
        &self,
        channel_type: ChannelType,
        attempts: u32,
        delivered: bool,
        error: Option<String>,
    ) {
        self.emit(ChannelEvent::DispatchOutcome {
            channel_type: channel_type.as_str().into(),
            attempts,
            delivered,
            error,
        })
        .await;
    }

    async fn emit(&self, event: ChannelEvent) {
        if let Some(sink) = &self.event_sink {
            sink.emit(event).await;
        }
    }
}
