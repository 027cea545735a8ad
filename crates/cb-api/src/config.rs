//! API server configuration, loadable from TOML with env overrides.

use cb_dialogue::FallbackConfig;
use chrono_tz::Tz;
use serde::Deserialize;

/// Top-level API server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Listen address (e.g., "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// IANA zone used when a request carries none (CALBOT_TIMEZONE env var).
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
    /// Local LLM fallback settings (FALLBACK_ENABLED env var).
    #[serde(default)]
    pub fallback: FallbackConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_timezone() -> String {
    "Asia/Kolkata".to_string()
}

impl ApiConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply overrides from process environment variables.
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup` (`CALBOT_TIMEZONE`, `FALLBACK_ENABLED`).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(tz) = lookup("CALBOT_TIMEZONE").filter(|v| !v.trim().is_empty()) {
            self.default_timezone = tz.trim().to_string();
        }
        if let Some(v) = lookup("FALLBACK_ENABLED") {
            self.fallback.enabled = v.eq_ignore_ascii_case("true") || v == "1";
        }
        self
    }

    /// The configured default zone.
    pub fn timezone(&self) -> anyhow::Result<Tz> {
        self.default_timezone.parse::<Tz>().map_err(|e| {
            anyhow::anyhow!("invalid default_timezone '{}': {e}", self.default_timezone)
        })
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            default_timezone: default_timezone(),
            fallback: FallbackConfig::default(),
        }
    }
}
