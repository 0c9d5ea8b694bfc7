// Runtime configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::adapters::outbound::lark_calendar::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT};
use crate::core::leave::correlation::DEFAULT_KEY_NAMESPACE;

const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub app_id: String,
    pub app_secret: String,
    pub verification_token: Option<String>,
    pub encrypt_key: Option<String>,
    pub redis_url: String,
    pub lark_base_url: String,
    pub key_namespace: String,
    pub http_addr: SocketAddr,
    pub calendar_timeout: Duration,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redacted = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("AppConfig")
            .field("app_id", &self.app_id)
            .field("app_secret", &"[REDACTED]")
            .field("verification_token", &redacted(&self.verification_token))
            .field("encrypt_key", &redacted(&self.encrypt_key))
            .field("redis_url", &"[REDACTED]")
            .field("lark_base_url", &self.lark_base_url)
            .field("key_namespace", &self.key_namespace)
            .field("http_addr", &self.http_addr)
            .field("calendar_timeout", &self.calendar_timeout)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any name -> value source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let http_addr = get("HTTP_ADDR")
            .unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: "HTTP_ADDR",
                reason: e.to_string(),
            })?;

        let calendar_timeout = match get("CALENDAR_TIMEOUT_SECS") {
            None => DEFAULT_REQUEST_TIMEOUT,
            Some(v) => match v.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                Ok(_) => {
                    return Err(ConfigError::Invalid {
                        name: "CALENDAR_TIMEOUT_SECS",
                        reason: "must be greater than zero".into(),
                    });
                }
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        name: "CALENDAR_TIMEOUT_SECS",
                        reason: e.to_string(),
                    });
                }
            },
        };

        Ok(Self {
            app_id: required("APP_ID")?,
            app_secret: required("APP_SECRET")?,
            verification_token: get("VERIFICATION_TOKEN"),
            encrypt_key: get("ENCRYPT_KEY"),
            redis_url: required("REDIS_URL")?,
            lark_base_url: get("LARK_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            key_namespace: get("KEY_NAMESPACE").unwrap_or_else(|| DEFAULT_KEY_NAMESPACE.to_string()),
            http_addr,
            calendar_timeout,
        })
    }
}
