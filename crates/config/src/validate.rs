//! Configuration validation.
//!
//! Checks config files for required channel fields and reports security
//! warnings for inline secrets.

use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;

use crate::{env_subst::substitute_env, schema::NestorConfig};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "io", "syntax", "missing-field", "invalid-field", "security"
    pub category: &'static str,
    /// Dotted path, e.g. "channels.telegram.token"
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn error(category: &'static str, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            category,
            path: path.into(),
            message: message.into(),
        }
    }

    fn warning(
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            category,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result of validating a configuration file.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Validate the config file at `path`.
///
/// Syntax problems short-circuit; field checks run against the parsed
/// config, security checks against the raw (pre-substitution) text.
pub fn validate_file(path: &Path) -> ValidationResult {
    let mut diagnostics = Vec::new();
    let config_path = Some(path.to_path_buf());

    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            diagnostics.push(Diagnostic::error(
                "io",
                "",
                format!("failed to read {}: {e}", path.display()),
            ));
            return ValidationResult {
                diagnostics,
                config_path,
            };
        },
    };

    let substituted = substitute_env(&raw);
    let config: NestorConfig = match parse(&substituted, path) {
        Ok(config) => config,
        Err(e) => {
            diagnostics.push(Diagnostic::error("syntax", "", e.to_string()));
            return ValidationResult {
                diagnostics,
                config_path,
            };
        },
    };

    diagnostics.extend(validate_config(&config));
    diagnostics.extend(security_checks(&raw));

    ValidationResult {
        diagnostics,
        config_path,
    }
}

/// Field-level checks on a parsed config. Unlike
/// [`NestorConfig::to_channel_configs`] this reports every problem, not just
/// the first.
#[must_use]
pub fn validate_config(config: &NestorConfig) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if let Some(tg) = &config.channels.telegram
        && tg.token.expose_secret().trim().is_empty()
    {
        diagnostics.push(Diagnostic::error(
            "missing-field",
            "channels.telegram.token",
            "telegram section present but no bot token set",
        ));
    }

    if let Some(em) = &config.channels.email {
        for (value, path) in [
            (em.relay_url.as_str(), "channels.email.relay_url"),
            (em.from_address.as_str(), "channels.email.from_address"),
        ] {
            if value.trim().is_empty() {
                diagnostics.push(Diagnostic::error(
                    "missing-field",
                    path,
                    "email section present but field is empty",
                ));
            }
        }
        if em.api_key.expose_secret().trim().is_empty() {
            diagnostics.push(Diagnostic::error(
                "missing-field",
                "channels.email.api_key",
                "email section present but no relay API key set",
            ));
        }
        if !em.from_address.trim().is_empty() && !em.from_address.contains('@') {
            diagnostics.push(Diagnostic::warning(
                "invalid-field",
                "channels.email.from_address",
                format!("{:?} does not look like an email address", em.from_address),
            ));
        }
    }

    let retry_paths = [
        (Some(&config.retry), "retry"),
        (
            config.channels.telegram.as_ref().and_then(|t| t.retry.as_ref()),
            "channels.telegram.retry",
        ),
        (
            config.channels.email.as_ref().and_then(|e| e.retry.as_ref()),
            "channels.email.retry",
        ),
    ];
    for (policy, path) in retry_paths {
        if let Some(policy) = policy
            && policy.base_delay_ms > policy.max_delay_ms
        {
            diagnostics.push(Diagnostic::warning(
                "invalid-field",
                path,
                format!(
                    "base_delay_ms ({}) exceeds max_delay_ms ({}); delays are capped at the maximum",
                    policy.base_delay_ms, policy.max_delay_ms
                ),
            ));
        }
    }

    if config.channels.telegram.is_none() && config.channels.email.is_none() {
        diagnostics.push(Diagnostic::warning(
            "missing-field",
            "channels",
            "no channels configured; every dispatch will fail",
        ));
    }

    diagnostics
}

/// Flag secrets stored inline instead of via `${ENV_VAR}` placeholders.
fn security_checks(raw: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for key in ["token", "api_key"] {
        for line in raw.lines() {
            let line = line.trim_start();
            let Some(value) = line
                .strip_prefix(key)
                .map(|rest| rest.trim_start())
                .and_then(|rest| rest.strip_prefix(['=', ':']))
            else {
                continue;
            };
            let value = value.trim();
            if !value.is_empty() && !value.contains("${") {
                diagnostics.push(Diagnostic::warning(
                    "security",
                    key,
                    format!("{key} is stored inline; prefer a ${{ENV_VAR}} placeholder"),
                ));
            }
        }
    }
    diagnostics
}

fn parse(raw: &str, path: &Path) -> anyhow::Result<NestorConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate_toml(contents: &str) -> ValidationResult {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nestor.toml");
        std::fs::write(&path, contents).unwrap();
        validate_file(&path)
    }

    #[test]
    fn env_placeholder_config_is_clean() {
        let result = validate_toml(
            "[channels.telegram]\ntoken = \"${TELEGRAM_BOT_TOKEN_UNSET_FOR_TEST}\"\n",
        );
        // The placeholder is unresolved, so the token is non-empty but the
        // security check stays quiet.
        assert!(!result.has_errors());
        assert_eq!(result.count(Severity::Warning), 0);
    }

    #[test]
    fn missing_token_is_an_error() {
        let result = validate_toml("[channels.telegram]\nallowlist = [\"42\"]\n");
        assert!(result.has_errors());
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.path == "channels.telegram.token")
        );
    }

    #[test]
    fn inline_secret_warns() {
        let result = validate_toml("[channels.telegram]\ntoken = \"123:ABC\"\n");
        assert!(!result.has_errors());
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.category == "security" && d.severity == Severity::Warning)
        );
    }

    #[test]
    fn email_problems_are_all_reported() {
        let result = validate_toml("[channels.email]\nfrom_address = \"not-an-address\"\n");
        // relay_url and api_key missing, from_address malformed.
        assert_eq!(result.count(Severity::Error), 2);
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.category == "invalid-field")
        );
    }

    #[test]
    fn inverted_retry_delays_warn() {
        let result = validate_toml(
            "[retry]\nbase_delay_ms = 60000\nmax_delay_ms = 30000\n\n[channels.telegram]\ntoken = \"${TG_TOKEN_UNSET_FOR_TEST}\"\n",
        );
        assert!(!result.has_errors());
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.path == "retry" && d.category == "invalid-field")
        );
    }

    #[test]
    fn no_channels_warns() {
        let result = validate_toml("[log]\nlevel = \"debug\"\n");
        assert!(!result.has_errors());
        assert!(result.diagnostics.iter().any(|d| d.path == "channels"));
    }

    #[test]
    fn syntax_error_is_reported() {
        let result = validate_toml("[channels.telegram\ntoken = ");
        assert!(result.has_errors());
        assert_eq!(result.diagnostics[0].category, "syntax");
    }

    #[test]
    fn unreadable_file_is_reported() {
        let result = validate_file(Path::new("/nonexistent/nestor.toml"));
        assert!(result.has_errors());
        assert_eq!(result.diagnostics[0].category, "io");
    }
}
