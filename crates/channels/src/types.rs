use {
    serde::{Deserialize, Serialize},
    std::str::FromStr,
};

/// Closed enumeration of supported backend kinds.
///
/// Used as the registry key for backend lookup, not as a runtime
/// polymorphism tag — the orchestrator dispatches through the
/// [`ChannelBackend`](crate::ChannelBackend) trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    Telegram,
    Email,
}

impl ChannelType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Telegram => "telegram",
            Self::Email => "email",
        }
    }

    /// All known channel types, in registry-key order.
    pub const ALL: &[ChannelType] = &[ChannelType::Telegram, ChannelType::Email];
}

impl std::fmt::Display for ChannelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "telegram" => Ok(Self::Telegram),
            "email" => Ok(Self::Email),
            other => Err(format!("unknown channel type: {other}")),
        }
    }
}

/// An already-formatted outbound payload plus its recipient.
///
/// The core treats the body as an opaque blob; composition and formatting
/// happen upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Recipient identifier (chat ID, email address).
    pub to: String,
    /// Opaque message body.
    pub body: String,
    /// Optional subject line; only meaningful for backends that have one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl OutboundMessage {
    #[must_use]
    pub fn text(to: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            body: body.into(),
            subject: None,
        }
    }

    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

/// Proof of delivery returned by a successful dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReceipt {
    pub channel_type: ChannelType,
    /// Backend-assigned message identifier.
    pub message_id: String,
    /// How many attempts the dispatch took, including the successful one.
    pub attempts: u32,
    pub delivered_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_type_round_trips_through_str() {
        for ct in ChannelType::ALL {
            assert_eq!(ct.as_str().parse::<ChannelType>().as_ref(), Ok(ct));
        }
    }

    #[test]
    fn unknown_channel_type_is_an_error() {
        assert!("carrier_pigeon".parse::<ChannelType>().is_err());
    }

    #[test]
    fn channel_type_serde_uses_snake_case() {
        let json = serde_json::to_string(&ChannelType::Telegram).unwrap();
        assert_eq!(json, "\"telegram\"");
    }

    #[test]
    fn message_builder_sets_subject() {
        let msg = OutboundMessage::text("user@example.com", "hi").with_subject("Reminder");
        assert_eq!(msg.subject.as_deref(), Some("Reminder"));
    }
}
