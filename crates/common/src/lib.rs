//! Small utilities shared across the nestor crates.

pub mod time;

pub use time::{unix_now, unix_now_millis};
