//! Provider configuration
//!
//! Settings come from the provider block's attributes, falling back to
//! `CLOUDSTACK_*` environment variables.

use std::collections::HashMap;
use std::time::Duration;

use cloudstack_core::provider::{ProviderError, ProviderResult};
use cloudstack_core::resource::Value;

/// Connection settings for the CloudStack API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// API endpoint, e.g. `https://cloud.example.com/client/api`
    pub api_url: String,
    pub api_key: String,
    pub secret_key: String,
    /// Send mutating commands as GET instead of a POST form
    pub http_get_only: bool,
    /// Upper bound on waiting for an asynchronous job
    pub timeout: Duration,
    /// Delay between `queryAsyncJobResult` polls
    pub poll_interval: Duration,
}

impl ProviderConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(900);
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            http_get_only: false,
            timeout: Self::DEFAULT_TIMEOUT,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_http_get_only(mut self, http_get_only: bool) -> Self {
        self.http_get_only = http_get_only;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Build from provider block attributes with environment fallback
    pub fn from_attributes(attributes: &HashMap<String, Value>) -> ProviderResult<Self> {
        Self::from_sources(attributes, |key| std::env::var(key).ok())
    }

    /// Build from attributes, resolving missing ones through `env`
    pub fn from_sources(
        attributes: &HashMap<String, Value>,
        env: impl Fn(&str) -> Option<String>,
    ) -> ProviderResult<Self> {
        let lookup = |attr: &str, var: &str| -> Option<String> {
            match attributes.get(attr) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                _ => env(var).filter(|s| !s.is_empty()),
            }
        };

        let required = |attr: &str, var: &str| {
            lookup(attr, var).ok_or_else(|| {
                ProviderError::configuration(format!(
                    "Missing required provider setting '{}' (or {})",
                    attr, var
                ))
            })
        };

        let api_url = required("api_url", "CLOUDSTACK_API_URL")?;
        let api_key = required("api_key", "CLOUDSTACK_API_KEY")?;
        let secret_key = required("secret_key", "CLOUDSTACK_SECRET_KEY")?;

        let http_get_only = match attributes.get("http_get_only") {
            Some(Value::Bool(b)) => *b,
            _ => match env("CLOUDSTACK_HTTP_GET_ONLY") {
                Some(s) => parse_bool("CLOUDSTACK_HTTP_GET_ONLY", &s)?,
                None => false,
            },
        };

        let timeout = match attributes.get("timeout") {
            Some(Value::Int(secs)) => seconds("timeout", *secs)?,
            _ => match env("CLOUDSTACK_TIMEOUT") {
                Some(s) => {
                    let secs = s.trim().parse::<i64>().map_err(|_| {
                        ProviderError::configuration(format!(
                            "CLOUDSTACK_TIMEOUT must be a number of seconds, got '{}'",
                            s
                        ))
                    })?;
                    seconds("CLOUDSTACK_TIMEOUT", secs)?
                }
                None => Self::DEFAULT_TIMEOUT,
            },
        };

        Ok(Self::new(api_url, api_key, secret_key)
            .with_http_get_only(http_get_only)
            .with_timeout(timeout))
    }
}

fn parse_bool(name: &str, s: &str) -> ProviderResult<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(ProviderError::configuration(format!(
            "{} must be true or false, got '{}'",
            name, other
        ))),
    }
}

fn seconds(name: &str, secs: i64) -> ProviderResult<Duration> {
    u64::try_from(secs)
        .map(Duration::from_secs)
        .map_err(|_| ProviderError::configuration(format!("{} must not be negative", name)))
}
