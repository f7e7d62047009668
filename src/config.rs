use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_FEED_BASE_URL: &str = "http://site.api.espn.com/apis/site/v2/sports";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
}

/// Process-wide settings, built once at startup and handed to each component.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub debug: bool,
    pub port: u16,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_timeout: Duration,
    pub feed_base_url: String,
    pub feed_timeout: Duration,
    pub cache_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "Sports Prediction Bot".to_string(),
            debug: false,
            port: 3000,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_timeout: Duration::from_secs(30),
            feed_base_url: DEFAULT_FEED_BASE_URL.to_string(),
            feed_timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(60),
        }
    }
}

impl Config {
    /// Read settings from the environment (call `dotenv` first to pick up `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let string = |key: &str, default: String| lookup(key).unwrap_or(default);

        Ok(Self {
            app_name: string("APP_NAME", defaults.app_name),
            debug: parse(&lookup, "DEBUG")?.unwrap_or(defaults.debug),
            port: parse(&lookup, "PORT")?.unwrap_or(defaults.port),
            openai_api_key: lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
            openai_base_url: string("OPENAI_BASE_URL", defaults.openai_base_url),
            openai_model: string("OPENAI_MODEL", defaults.openai_model),
            openai_timeout: parse(&lookup, "OPENAI_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.openai_timeout),
            feed_base_url: string("FEED_BASE_URL", defaults.feed_base_url),
            feed_timeout: parse(&lookup, "FEED_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.feed_timeout),
            cache_ttl: parse(&lookup, "CACHE_TTL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
        })
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key: key.to_string(), value: raw }),
    }
}
