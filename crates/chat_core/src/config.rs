//! Environment-driven configuration for the upstream connection.

use serde::{Deserialize, Serialize};

const DEFAULT_API_BASE: &str = "https://api.anthropic.com/v1";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
const DEFAULT_MAX_TOKENS: u32 = 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Upstream API key. Absent means every exchange fails with a
    /// configuration error before any network call is made.
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub max_tokens: u32,
    /// Pre-verified admin bypass: when set, the persona filter is skipped
    /// for callers the surrounding deployment has already authorized.
    #[serde(default)]
    pub admin_bypass: bool,
    /// When set, pre-rewrite payloads are copied verbatim to the audit log.
    #[serde(default)]
    pub audit_log: bool,
}

fn parse_bool_env(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            admin_bypass: false,
            audit_log: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    ///
    /// - `VERDI_API_KEY`: upstream API key
    /// - `VERDI_API_BASE`: upstream base URL (default: Anthropic v1)
    /// - `VERDI_MODEL`: model identifier
    /// - `VERDI_MAX_TOKENS`: response token cap (default: 1024)
    /// - `VERDI_ADMIN_BYPASS`: skip the persona filter (default: off)
    /// - `VERDI_AUDIT_LOG`: log pre-rewrite payloads verbatim (default: off)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("VERDI_API_KEY").ok().filter(|k| !k.is_empty()),
            api_base: std::env::var("VERDI_API_BASE")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.api_base),
            model: std::env::var("VERDI_MODEL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.model),
            max_tokens: std::env::var("VERDI_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_tokens),
            admin_bypass: std::env::var("VERDI_ADMIN_BYPASS")
                .map(|v| parse_bool_env(&v))
                .unwrap_or(false),
            audit_log: std::env::var("VERDI_AUDIT_LOG")
                .map(|v| parse_bool_env(&v))
                .unwrap_or(false),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.api_key.is_none());
        assert_eq!(config.max_tokens, 1024);
        assert!(!config.admin_bypass);
        assert!(config.api_base.contains("anthropic"));
    }

    #[test]
    fn test_parse_bool_env() {
        assert!(parse_bool_env("1"));
        assert!(parse_bool_env(" TRUE "));
        assert!(parse_bool_env("on"));
        assert!(!parse_bool_env("0"));
        assert!(!parse_bool_env("nope"));
    }

    #[test]
    fn test_builder_overrides() {
        let config = Config::default()
            .with_api_key("k")
            .with_api_base("http://localhost:9999");
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.api_base, "http://localhost:9999");
    }
}
