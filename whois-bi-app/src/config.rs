//! Application configuration.
//!
//! Loaded from an optional TOML file; every field has a default. A few
//! settings can be overridden from the environment:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `WHOIS_BI_URL` | `client.base_url` |
//! | `WHOIS_BI_POLL_INTERVAL` | `store.poll_interval` (e.g. `5s`, `1m`) |

use std::path::Path;

use humantime_serde::re::humantime;
use serde::{Deserialize, Serialize};
use url::Url;
use whois_bi_client::ClientConfig;
use whois_bi_core::error::{CoreError, CoreResult};
use whois_bi_core::StoreConfig;

pub const ENV_URL: &str = "WHOIS_BI_URL";
pub const ENV_POLL_INTERVAL: &str = "WHOIS_BI_POLL_INTERVAL";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub store: StoreConfig,
}

impl AppConfig {
    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> CoreResult<Self> {
        toml::from_str(text).map_err(|e| CoreError::ConfigError(e.to_string()))
    }

    /// Load `path` (defaults when `None`), apply environment overrides and validate.
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    CoreError::ConfigError(format!("Failed to read {}: {e}", path.display()))
                })?;
                Self::from_toml(&text)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (the process environment in [`Self::load`]).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> CoreResult<()> {
        if let Some(url) = lookup(ENV_URL) {
            log::debug!("{ENV_URL} overrides base_url");
            self.client.base_url = url;
        }
        if let Some(interval) = lookup(ENV_POLL_INTERVAL) {
            self.store.poll_interval = humantime::parse_duration(interval.trim())
                .map_err(|e| CoreError::ConfigError(format!("{ENV_POLL_INTERVAL}: {e}")))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> CoreResult<()> {
        Url::parse(&self.client.base_url).map_err(|e| {
            CoreError::ConfigError(format!("Invalid base_url {}: {e}", self.client.base_url))
        })?;
        if self.client.timeout.is_zero() || self.client.connect_timeout.is_zero() {
            return Err(CoreError::ConfigError(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        self.store.validate()
    }
}
