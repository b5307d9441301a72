//! Email channel backend for nestor.
//!
//! Sends outbound mail through an HTTP relay API. The wire client sits
//! behind the [`MailTransport`](transport::MailTransport) trait so backend
//! logic (gating, truncation, state) is testable without a network, and so
//! a different transport (direct SMTP, provider SDK) can be dropped in
//! without touching the backend.

pub mod backend;
pub mod config;
pub mod transport;

pub use {
    backend::EmailBackend,
    config::EmailConfig,
    transport::{HttpRelayTransport, MailTransport},
};
