use std::time::Duration;

use court_coordination::RetryPolicy;
use thiserror::Error;

/// Default Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Flash tier: higher quota, fewer rate-limit failures.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Adjudication service configuration.
///
/// Built once at the process boundary and handed to the backend explicitly;
/// nothing below this layer reads the environment.
#[derive(Debug, Clone)]
pub struct CourtConfig {
    /// Service credential. `None` makes every call fail with a configuration error.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for CourtConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            temperature: DEFAULT_TEMPERATURE,
            request_timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
        }
    }
}

impl CourtConfig {
    /// Read configuration from the process environment.
    ///
    /// `COURT_API_KEY` (falling back to `API_KEY`), `COURT_BASE_URL`,
    /// `COURT_MODEL`, `COURT_TEMPERATURE`, `COURT_MAX_RETRIES` and
    /// `COURT_BASE_DELAY_MS` override the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.api_key = lookup("COURT_API_KEY")
            .or_else(|| lookup("API_KEY"))
            .filter(|key| !key.trim().is_empty());
        if let Some(url) = lookup("COURT_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("COURT_MODEL") {
            config.model = model;
        }
        if let Some(raw) = lookup("COURT_TEMPERATURE") {
            config.temperature = parse_var("COURT_TEMPERATURE", &raw)?;
        }
        if let Some(raw) = lookup("COURT_MAX_RETRIES") {
            config.retry.max_retries = parse_var("COURT_MAX_RETRIES", &raw)?;
        }
        if let Some(raw) = lookup("COURT_BASE_DELAY_MS") {
            let ms: u64 = parse_var("COURT_BASE_DELAY_MS", &raw)?;
            config.retry.base_delay = Duration::from_millis(ms);
        }
        Ok(config)
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: raw.to_string(),
    })
}
