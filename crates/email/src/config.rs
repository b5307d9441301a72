use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

const DEFAULT_MAX_BODY_CHARS: usize = 10_000;

/// Configuration for the email backend.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// Base URL of the HTTP mail relay.
    pub relay_url: String,

    /// Sender address; its domain is also used for generated message IDs.
    pub from_address: String,

    /// Relay API key.
    #[serde(serialize_with = "serialize_secret")]
    pub api_key: Secret<String>,

    /// Recipient allowlist. Empty means open.
    pub allowed_recipients: Vec<String>,

    /// Bodies longer than this are truncated with a marker.
    pub max_body_chars: usize,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("relay_url", &self.relay_url)
            .field("from_address", &self.from_address)
            .field("api_key", &"[REDACTED]")
            .field("allowed_recipients", &self.allowed_recipients)
            .field("max_body_chars", &self.max_body_chars)
            .finish()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            relay_url: String::new(),
            from_address: String::new(),
            api_key: Secret::new(String::new()),
            allowed_recipients: Vec::new(),
            max_body_chars: DEFAULT_MAX_BODY_CHARS,
        }
    }
}
