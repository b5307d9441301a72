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
    config::EmailConfig,
    transport::{HttpRelayTransport, MailTransport},
};

const FALLBACK_SUBJECT: &str = "(no subject)";

/// Email channel backend.
pub struct EmailBackend {
    config: EmailConfig,
    transport: Arc<dyn MailTransport>,
    status: StatusCell,
}

impl EmailBackend {
    /// Build the backend from config. Validates required fields but performs
    /// no network I/O.
    pub fn new(config: EmailConfig) -> Result<Self, ConnectError> {
        let transport = Arc::new(HttpRelayTransport::new(&config)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Build with an explicit transport (tests, alternative wire protocols).
    pub fn with_transport(config: EmailConfig, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            config,
            transport,
            status: StatusCell::new(),
        }
    }

    /// Cap the body at `max_body_chars`, marking the cut.
    fn truncate_body(&self, body: &str) -> String {
        if body.chars().count() <= self.config.max_body_chars {
            return body.to_string();
        }
        let truncated: String = body.chars().take(self.config.max_body_chars).collect();
        format!("{truncated}\n\n[truncated]")
    }
}

#[async_trait]
impl ChannelBackend for EmailBackend {
    fn channel_type(&self) -> ChannelType {
        ChannelType::Email
    }

    fn name(&self) -> &str {
        "Email"
    }

    fn status_cell(&self) -> &StatusCell {
        &self.status
    }

    async fn connect(&self) -> Result<(), ConnectError> {
        self.status.advance(ChannelState::Connecting);
        self.transport.probe().await?;
        self.status.advance(ChannelState::Ready);
        info!(from = %self.config.from_address, "email backend connected");
        Ok(())
    }

    async fn send(&self, message: &OutboundMessage) -> Result<String, SendError> {
        if !allowlist::is_allowed(&message.to, &self.config.allowed_recipients) {
            return Err(SendError::permanent(format!(
                "recipient {:?} not in email allowlist",
                message.to
            )));
        }
        let subject = message.subject.as_deref().unwrap_or(FALLBACK_SUBJECT);
        let body = self.truncate_body(&message.body);
        self.transport.send_mail(&message.to, subject, &body).await
    }

    async fn shutdown(&self) -> Result<(), ShutdownError> {
        if self.status.advance(ChannelState::Shutdown).is_some() {
            info!("email backend shut down");
        } else {
            warn!("email backend already shut down");
        }
        Ok(())
    }
}
