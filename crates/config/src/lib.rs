//! Configuration loading, validation, and env substitution.
//!
//! Config files: `nestor.toml`, `nestor.yaml`, or `nestor.json`,
//! searched in `./` then `~/.config/nestor/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{config_dir, discover_and_load, find_config_file, load_config},
    schema::{
        ChannelsConfig, ConfigError, EmailSection, LogConfig, NestorConfig, TelegramSection,
    },
    validate::{Diagnostic, Severity, ValidationResult, validate_file},
};
