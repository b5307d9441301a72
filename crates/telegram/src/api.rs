use {
    async_trait::async_trait,
    secrecy::ExposeSecret,
    teloxide::{
        RequestError,
        prelude::Requester,
        types::{ChatId, Recipient},
    },
    tracing::debug,
};

use nestor_channels::{ConnectError, SendError};

use crate::config::TelegramConfig;

/// Narrow seam in front of the Telegram Bot API.
///
/// The production implementation is [`BotApi`]; tests substitute scripted
/// fakes so backend logic runs without a network.
#[async_trait]
pub trait TelegramApi: Send + Sync {
    /// Identity probe. Returns the bot username on success.
    async fn get_me(&self) -> Result<String, ConnectError>;

    /// Send a text message, returning the Telegram message ID.
    async fn send_message(&self, to: &str, text: &str) -> Result<String, SendError>;
}

/// teloxide-backed API client.
#[derive(Debug)]
pub struct BotApi {
    bot: teloxide::Bot,
}

impl BotApi {
    /// Build a client from config. No network I/O happens here.
    pub fn new(config: &TelegramConfig) -> Result<Self, ConnectError> {
        let token = config.token.expose_secret();
        if token.is_empty() {
            return Err(ConnectError::invalid_config("telegram bot token is required"));
        }
        let mut bot = teloxide::Bot::new(token.clone());
        if let Some(url) = &config.api_url {
            let parsed = reqwest::Url::parse(url)
                .map_err(|e| ConnectError::invalid_config(format!("bad api_url {url:?}: {e}")))?;
            bot = bot.set_api_url(parsed);
        }
        Ok(Self { bot })
    }
}

#[async_trait]
impl TelegramApi for BotApi {
    async fn get_me(&self) -> Result<String, ConnectError> {
        let me = self.bot.get_me().await.map_err(map_connect_error)?;
        Ok(me.username.clone().unwrap_or_else(|| "unknown".into()))
    }

    async fn send_message(&self, to: &str, text: &str) -> Result<String, SendError> {
        let recipient = parse_recipient(to)?;
        let message = self
            .bot
            .send_message(recipient, text)
            .await
            .map_err(map_send_error)?;
        debug!(message_id = message.id.0, "telegram message sent");
        Ok(message.id.0.to_string())
    }
}

/// `@username` targets channels/groups by name; anything else must be a
/// numeric chat ID.
fn parse_recipient(to: &str) -> Result<Recipient, SendError> {
    if let Some(stripped) = to.strip_prefix('@') {
        if stripped.is_empty() {
            return Err(SendError::permanent("empty telegram username"));
        }
        return Ok(Recipient::ChannelUsername(to.to_string()));
    }
    to.parse::<i64>()
        .map(|id| Recipient::Id(ChatId(id)))
        .map_err(|_| SendError::permanent(format!("invalid telegram chat id: {to:?}")))
}

fn map_connect_error(err: RequestError) -> ConnectError {
    match err {
        RequestError::Api(api) => ConnectError::auth(api),
        RequestError::Network(e) => ConnectError::network(e),
        RequestError::Io(e) => ConnectError::network(e),
        RequestError::RetryAfter(secs) => {
            ConnectError::network(format!("rate limited, retry after {}s", secs.seconds()))
        },
        other => ConnectError::external("telegram get_me", other),
    }
}

fn map_send_error(err: RequestError) -> SendError {
    match err {
        // Rate limits and connectivity blips resolve on retry.
        RequestError::RetryAfter(secs) => {
            SendError::transient(format!("rate limited, retry after {}s", secs.seconds()))
        },
        RequestError::Network(e) => SendError::transient(e),
        RequestError::Io(e) => SendError::transient(e),
        // API rejections (bad chat, forbidden, message too long) do not.
        RequestError::Api(api) => SendError::permanent(api),
        other => SendError::permanent(other),
    }
}
