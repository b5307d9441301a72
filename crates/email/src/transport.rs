use {
    async_trait::async_trait,
    secrecy::ExposeSecret,
    serde::Serialize,
    tracing::debug,
};

use {
    nestor_channels::{ConnectError, SendError},
    nestor_common::unix_now_millis,
};

use crate::config::EmailConfig;

/// Narrow seam in front of the mail wire protocol.
///
/// Production uses [`HttpRelayTransport`]; tests substitute scripted fakes.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Reachability/auth probe against the relay.
    async fn probe(&self) -> Result<(), ConnectError>;

    /// Send one message, returning its message ID.
    async fn send_mail(&self, to: &str, subject: &str, body: &str) -> Result<String, SendError>;
}

#[derive(Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// HTTP mail relay client.
///
/// POSTs JSON messages to `{relay_url}/messages` with bearer auth and probes
/// `{relay_url}/health` for connectivity.
#[derive(Debug)]
pub struct HttpRelayTransport {
    client: reqwest::Client,
    relay_url: String,
    from_address: String,
    api_key: String,
}

impl HttpRelayTransport {
    /// Build the client from config. No network I/O happens here.
    pub fn new(config: &EmailConfig) -> Result<Self, ConnectError> {
        if config.relay_url.is_empty() {
            return Err(ConnectError::invalid_config("email relay_url is required"));
        }
        if config.from_address.is_empty() {
            return Err(ConnectError::invalid_config(
                "email from_address is required",
            ));
        }
        reqwest::Url::parse(&config.relay_url).map_err(|e| {
            ConnectError::invalid_config(format!("bad relay_url {:?}: {e}", config.relay_url))
        })?;
        Ok(Self {
            client: reqwest::Client::new(),
            relay_url: config.relay_url.trim_end_matches('/').to_string(),
            from_address: config.from_address.clone(),
            api_key: config.api_key.expose_secret().clone(),
        })
    }
}

#[async_trait]
impl MailTransport for HttpRelayTransport {
    async fn probe(&self) -> Result<(), ConnectError> {
        let url = format!("{}/health", self.relay_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ConnectError::network(format!("relay unreachable: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ConnectError::auth(format!("relay rejected api key: {status}")));
        }
        if !status.is_success() {
            return Err(ConnectError::network(format!("relay health check: {status}")));
        }
        Ok(())
    }

    async fn send_mail(&self, to: &str, subject: &str, body: &str) -> Result<String, SendError> {
        let url = format!("{}/messages", self.relay_url);
        let payload = RelayMessage {
            from: &self.from_address,
            to,
            subject,
            body,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SendError::transient(format!("relay unreachable: {e}")))?;

        let status = response.status();
        if status.is_success() {
            // Prefer the relay-assigned ID when the response carries one.
            let id = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v.get("id").and_then(|id| id.as_str().map(String::from)));
            let message_id =
                id.unwrap_or_else(|| generate_message_id(to, sender_domain(&self.from_address)));
            debug!(%message_id, "email accepted by relay");
            return Ok(message_id);
        }

        let detail = format!("relay returned {status}");
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            Err(SendError::transient(detail))
        } else {
            Err(SendError::permanent(detail))
        }
    }
}

fn sender_domain(from_address: &str) -> &str {
    from_address.split('@').nth(1).unwrap_or("localhost")
}

/// RFC-style message ID: `<unix_millis-recipient@sender-domain>`.
#[must_use]
pub fn generate_message_id(to: &str, domain: &str) -> String {
    format!(
        "<{}-{}@{}>",
        unix_now_millis(),
        to.replace('@', "-at-"),
        domain
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_relay_url_rejected() {
        let cfg = EmailConfig {
            from_address: "bot@test.com".into(),
            ..Default::default()
        };
        let err = HttpRelayTransport::new(&cfg).unwrap_err();
        assert!(matches!(err, ConnectError::InvalidConfig { .. }));
    }

    #[test]
    fn missing_from_address_rejected() {
        let cfg = EmailConfig {
            relay_url: "https://relay.test".into(),
            ..Default::default()
        };
        assert!(HttpRelayTransport::new(&cfg).is_err());
    }

    #[test]
    fn malformed_relay_url_rejected() {
        let cfg = EmailConfig {
            relay_url: "not a url".into(),
            from_address: "bot@test.com".into(),
            ..Default::default()
        };
        assert!(HttpRelayTransport::new(&cfg).is_err());
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let cfg = EmailConfig {
            relay_url: "https://relay.test/".into(),
            from_address: "bot@test.com".into(),
            ..Default::default()
        };
        let transport = HttpRelayTransport::new(&cfg).unwrap();
        assert_eq!(transport.relay_url, "https://relay.test");
    }

    #[test]
    fn sender_domain_falls_back_to_localhost() {
        assert_eq!(sender_domain("assistant@nestor.dev"), "nestor.dev");
        assert_eq!(sender_domain("not-an-address"), "localhost");
    }

    #[test]
    fn message_id_shape() {
        let id = generate_message_id("alice@example.com", "nestor.dev");
        assert!(id.starts_with('<'));
        assert!(id.ends_with("@nestor.dev>"));
        assert!(id.contains("alice-at-example.com"));
    }
}
