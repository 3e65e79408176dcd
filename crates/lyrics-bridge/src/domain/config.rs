//! Bridge configuration with validation.
//!
//! Defaults match the search worker's own defaults so both sides agree on
//! channel names without extra setup.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Default outbound channel
pub const DEFAULT_REQUEST_CHANNEL: &str = "lyrics:requests";
/// Default inbound channel
pub const DEFAULT_RESULT_CHANNEL: &str = "lyrics:results";
/// Default wait for a reply
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Main bridge configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Pub/sub channel names
    pub channels: ChannelConfig,
    /// Timeout configuration
    pub timeouts: TimeoutConfig,
    /// Broker connection
    pub redis: RedisConfig,
}

/// Channel names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Channel search requests are published on
    pub request: String,
    /// Channel search results arrive on
    pub result: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            request: DEFAULT_REQUEST_CHANNEL.to_string(),
            result: DEFAULT_RESULT_CHANNEL.to_string(),
        }
    }
}

/// Timeout configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// How long `await_result` waits when the caller gives no timeout
    pub default_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            default_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Redis connection parameters
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub db: i64,
    pub password: Option<String>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            db: 0,
            password: None,
        }
    }
}

impl std::fmt::Debug for RedisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db", &self.db)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl BridgeConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channels.request.is_empty() || self.channels.result.is_empty() {
            return Err(ConfigError::InvalidChannel(
                "channel names cannot be empty".into(),
            ));
        }

        // The bridge would consume its own requests as replies
        if self.channels.request == self.channels.result {
            return Err(ConfigError::InvalidChannel(format!(
                "request and result channel are both '{}'",
                self.channels.request
            )));
        }

        if self.timeouts.default_secs == 0 {
            return Err(ConfigError::InvalidTimeout(
                "default timeout cannot be 0".into(),
            ));
        }

        if self.redis.host.is_empty() {
            return Err(ConfigError::InvalidRedis("host cannot be empty".into()));
        }

        Ok(())
    }

    /// Default wait for a reply
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.default_secs)
    }

    /// Build configuration from defaults overridden by environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `REDIS_HOST` (default: localhost)
    /// - `REDIS_PORT` (default: 6379)
    /// - `REDIS_DB` (default: 0)
    /// - `REDIS_PASSWORD` (default: unset)
    /// - `REDIS_REQUEST_CHANNEL` (default: lyrics:requests)
    /// - `REDIS_RESULT_CHANNEL` (default: lyrics:results)
    /// - `LYRICS_SEARCH_TIMEOUT_SECS` (default: 10)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("REDIS_HOST") {
            config.redis.host = host;
        }
        if let Some(port) = parse_var(&lookup, "REDIS_PORT") {
            config.redis.port = port;
        }
        if let Some(db) = parse_var(&lookup, "REDIS_DB") {
            config.redis.db = db;
        }
        if let Some(password) = lookup("REDIS_PASSWORD").filter(|p| !p.is_empty()) {
            config.redis.password = Some(password);
        }
        if let Some(channel) = lookup("REDIS_REQUEST_CHANNEL") {
            config.channels.request = channel;
        }
        if let Some(channel) = lookup("REDIS_RESULT_CHANNEL") {
            config.channels.result = channel;
        }
        if let Some(secs) = parse_var(&lookup, "LYRICS_SEARCH_TIMEOUT_SECS") {
            config.timeouts.default_secs = secs;
        }

        config
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(name)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "Ignoring unparsable environment variable");
            None
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid channel: {0}")]
    InvalidChannel(String),
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    #[error("invalid redis settings: {0}")]
    InvalidRedis(String),
}
