use std::sync::Arc;

use {
    async_trait::async_trait,
    tracing::{info, warn},
};

use nestor_channels::{
    ChannelBackend, ChannelState, ChannelType, ConnectError, OutboundMessage, SendError,
    ShutdownError, StatusCell, allowlist,
};

use crate::{
    api::{BotApi, TelegramApi},
    config::TelegramConfig,
};

/// Telegram channel backend.
pub struct TelegramBackend {
    config: TelegramConfig,
    api: Arc<dyn TelegramApi>,
    status: StatusCell,
}

impl TelegramBackend {
    /// Build the backend from config. Validates credentials are present but
    /// performs no network I/O — the connection is established lazily by the
    /// orchestrator's first dispatch.
    pub fn new(config: TelegramConfig) -> Result<Self, ConnectError> {
        let api = Arc::new(BotApi::new(&config)?);
        Ok(Self::with_api(config, api))
    }

    /// Build with an explicit API client (tests).
    pub fn with_api(config: TelegramConfig, api: Arc<dyn TelegramApi>) -> Self {
        Self {
            config,
            api,
            status: StatusCell::new(),
        }
    }
}

#[async_trait]
impl ChannelBackend for TelegramBackend {
    fn channel_type(&self) -> ChannelType {
        ChannelType::Telegram
    }

    fn name(&self) -> &str {
        "Telegram"
    }

    fn status_cell(&self) -> &StatusCell {
        &self.status
    }

    async fn connect(&self) -> Result<(), ConnectError> {
        self.status.advance(ChannelState::Connecting);
        let username = self.api.get_me().await?;
        self.status.advance(ChannelState::Ready);
        info!(bot = %username, "telegram backend connected");
        Ok(())
    }

    async fn send(&self, message: &OutboundMessage) -> Result<String, SendError> {
        if !allowlist::is_allowed(&message.to, &self.config.allowlist) {
            return Err(SendError::permanent(format!(
                "recipient {:?} not in telegram allowlist",
                message.to
            )));
        }
        // Telegram has no subject line; fold it into the body.
        let text = match &message.subject {
            Some(subject) => format!("{subject}\n\n{}", message.body),
            None => message.body.clone(),
        };
        self.api.send_message(&message.to, &text).await
    }

    async fn shutdown(&self) -> Result<(), ShutdownError> {
        if self.status.advance(ChannelState::Shutdown).is_some() {
            info!("telegram backend shut down");
        } else {
            warn!("telegram backend already shut down");
        }
        Ok(())
    }
}
