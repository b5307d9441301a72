//! Telegram channel backend for nestor.
//!
//! Implements `ChannelBackend` over the Telegram Bot API via teloxide. The
//! wire client sits behind the [`TelegramApi`](api::TelegramApi) trait so the
//! backend logic (gating, state, error translation) is testable without a
//! network.

pub mod api;
pub mod backend;
pub mod config;

pub use {backend::TelegramBackend, config::TelegramConfig};
