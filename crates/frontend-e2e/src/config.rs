//! Harness configuration
//!
//! TOML-based configuration with per-field defaults. Resolution order:
//! `E2E_CONFIG` file if set, otherwise built-in defaults, then the
//! `E2E_BASE_URL` environment override on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Configuration for a harness run.
///
/// Timeouts are stored in milliseconds so they round-trip through TOML;
/// use the duration accessors from harness code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Base URL of the application under test.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Run Chrome headless (default) or with a visible window.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Directory for diagnostic screenshots.
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,

    /// Bound for locating a single form field.
    #[serde(default = "default_field_timeout_ms")]
    pub field_timeout_ms: u64,

    /// Bound for a form (or tab panel) to become interactive.
    #[serde(default = "default_form_timeout_ms")]
    pub form_timeout_ms: u64,

    /// Bound for a success/validation confirmation text.
    #[serde(default = "default_confirm_timeout_ms")]
    pub confirm_timeout_ms: u64,

    /// Bound for the post-login welcome text.
    #[serde(default = "default_welcome_timeout_ms")]
    pub welcome_timeout_ms: u64,

    /// Bound for the whole sign-up-then-log-in session fixture.
    #[serde(default = "default_session_timeout_ms")]
    pub session_timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:5173".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("test-results")
}

fn default_field_timeout_ms() -> u64 {
    20_000
}

fn default_form_timeout_ms() -> u64 {
    30_000
}

fn default_confirm_timeout_ms() -> u64 {
    30_000
}

fn default_welcome_timeout_ms() -> u64 {
    10_000
}

fn default_session_timeout_ms() -> u64 {
    120_000
}

impl Default for HarnessConfig {
    fn default() -> Self {
        // serde defaults double as the programmatic defaults
        toml::from_str("").expect("empty config must deserialize")
    }
}

impl HarnessConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }

    /// Resolve the configuration for the current environment.
    ///
    /// Falls back to defaults when `E2E_CONFIG` is unset or unreadable;
    /// `E2E_BASE_URL` always wins over the file value.
    pub fn load() -> Self {
        let mut config = match std::env::var("E2E_CONFIG") {
            Ok(path) => Self::from_file(&path).unwrap_or_else(|e| {
                tracing::warn!("ignoring E2E_CONFIG ({e:#}); using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        if let Ok(url) = std::env::var("E2E_BASE_URL") {
            config.base_url = url;
        }
        config
    }

    /// Join a route onto the base URL.
    pub fn url(&self, route: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            route.trim_start_matches('/')
        )
    }

    pub fn field_timeout(&self) -> Duration {
        Duration::from_millis(self.field_timeout_ms)
    }

    pub fn form_timeout(&self) -> Duration {
        Duration::from_millis(self.form_timeout_ms)
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_millis(self.confirm_timeout_ms)
    }

    pub fn welcome_timeout(&self) -> Duration {
        Duration::from_millis(self.welcome_timeout_ms)
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_millis(self.session_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_the_documented_bounds() {
        let config = HarnessConfig::default();
        assert_eq!(config.base_url, "http://localhost:5173");
        assert!(config.headless);
        assert_eq!(config.field_timeout(), Duration::from_secs(20));
        assert_eq!(config.form_timeout(), Duration::from_secs(30));
        assert_eq!(config.confirm_timeout(), Duration::from_secs(30));
        assert_eq!(config.welcome_timeout(), Duration::from_secs(10));
        assert_eq!(config.session_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn partial_toml_keeps_defaults_for_the_rest() {
        let config = HarnessConfig::from_toml(
            r#"
            base_url = "http://127.0.0.1:8080"
            welcome_timeout_ms = 15000
            "#,
        )
        .expect("valid TOML");
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.welcome_timeout(), Duration::from_secs(15));
        assert_eq!(config.field_timeout(), Duration::from_secs(20));
    }

    #[test]
    fn url_joins_without_duplicate_slashes() {
        let mut config = HarnessConfig::default();
        config.base_url = "http://localhost:5173/".to_string();
        assert_eq!(config.url("/settings"), "http://localhost:5173/settings");
        assert_eq!(config.url("login"), "http://localhost:5173/login");
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(HarnessConfig::from_toml("base_url = [").is_err());
    }
}
