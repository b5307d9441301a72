//! Config schema: the channel sections plus logging and retry knobs.

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

use {
    nestor_channels::{ChannelType, RetryPolicy},
    nestor_gateway::ChannelConfig,
};

/// A required field is absent or empty. Deployment error, surfaced before
/// any backend is constructed and never retried.
#[derive(Debug, thiserror::Error)]
#[error("missing required config field: {path}")]
pub struct ConfigError {
    pub path: &'static str,
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NestorConfig {
    pub channels: ChannelsConfig,
    /// Retry policy applied to every channel unless a section overrides it.
    pub retry: RetryPolicy,
    pub log: LogConfig,
}

/// One optional section per supported channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<TelegramSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailSection>,
}

/// `[channels.telegram]` section.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramSection {
    pub enabled: bool,
    /// Bot token from @BotFather.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,
    /// Override for the Bot API base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Recipient allowlist. Empty means open.
    pub allowlist: Vec<String>,
    /// Per-channel retry override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryPolicy>,
}

impl Default for TelegramSection {
    fn default() -> Self {
        Self {
            enabled: true,
            token: Secret::new(String::new()),
            api_url: None,
            allowlist: Vec::new(),
            retry: None,
        }
    }
}

impl std::fmt::Debug for TelegramSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSection")
            .field("enabled", &self.enabled)
            .field("token", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("allowlist", &self.allowlist)
            .field("retry", &self.retry)
            .finish()
    }
}

/// `[channels.email]` section.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSection {
    pub enabled: bool,
    /// Base URL of the HTTP mail relay.
    pub relay_url: String,
    /// Sender address.
    pub from_address: String,
    /// Relay API key.
    #[serde(serialize_with = "serialize_secret")]
    pub api_key: Secret<String>,
    /// Recipient allowlist. Empty means open.
    pub allowed_recipients: Vec<String>,
    /// Body truncation limit; the backend default applies when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_body_chars: Option<usize>,
    /// Per-channel retry override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryPolicy>,
}

impl Default for EmailSection {
    fn default() -> Self {
        Self {
            enabled: true,
            relay_url: String::new(),
            from_address: String::new(),
            api_key: Secret::new(String::new()),
            allowed_recipients: Vec::new(),
            max_body_chars: None,
            retry: None,
        }
    }
}

impl std::fmt::Debug for EmailSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailSection")
            .field("enabled", &self.enabled)
            .field("relay_url", &self.relay_url)
            .field("from_address", &self.from_address)
            .field("api_key", &"[REDACTED]")
            .field("allowed_recipients", &self.allowed_recipients)
            .field("max_body_chars", &self.max_body_chars)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Logging options consumed by the binary's subscriber setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default level filter (overridable via `RUST_LOG`).
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
        }
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

impl NestorConfig {
    /// Build the orchestrator's per-channel config bundles.
    ///
    /// Fails on the first missing required field. Disabled sections still
    /// produce a (disabled) bundle so the orchestrator can name them in
    /// errors instead of treating them as unknown.
    pub fn to_channel_configs(&self) -> Result<Vec<ChannelConfig>, ConfigError> {
        let mut configs = Vec::new();

        if let Some(tg) = &self.channels.telegram {
            if tg.token.expose_secret().trim().is_empty() {
                return Err(ConfigError {
                    path: "channels.telegram.token",
                });
            }
            let payload = serde_json::json!({
                "token": tg.token.expose_secret(),
                "api_url": tg.api_url,
                "allowlist": tg.allowlist,
            });
            let mut config = ChannelConfig::new(ChannelType::Telegram, payload)
                .with_retry(tg.retry.unwrap_or(self.retry));
            if !tg.enabled {
                config = config.disabled();
            }
            configs.push(config);
        }

        if let Some(em) = &self.channels.email {
            for (value, path) in [
                (&em.relay_url, "channels.email.relay_url"),
                (&em.from_address, "channels.email.from_address"),
            ] {
                if value.trim().is_empty() {
                    return Err(ConfigError { path });
                }
            }
            if em.api_key.expose_secret().trim().is_empty() {
                return Err(ConfigError {
                    path: "channels.email.api_key",
                });
            }
            let mut payload = serde_json::json!({
                "relay_url": em.relay_url,
                "from_address": em.from_address,
                "api_key": em.api_key.expose_secret(),
                "allowed_recipients": em.allowed_recipients,
            });
            if let Some(max) = em.max_body_chars {
                payload["max_body_chars"] = max.into();
            }
            let mut config = ChannelConfig::new(ChannelType::Email, payload)
                .with_retry(em.retry.unwrap_or(self.retry));
            if !em.enabled {
                config = config.disabled();
            }
            configs.push(config);
        }

        Ok(configs)
    }
}
