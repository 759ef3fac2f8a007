use std::{path::PathBuf, time::Duration};

use crate::error::ProcessorError;

pub const DEFAULT_API_KEY: &str = "test_api_key_123";
pub const DEFAULT_API_URL: &str = "https://postman-echo.com/get";
pub const DEFAULT_RATE_LIMIT_SECS: f64 = 1.0;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub csv_file: PathBuf,
    pub api_key: String,
    pub api_url: String,
    pub rate_limit: Duration,
    pub enable_mock_pricing: bool,
    /// Send the placeholder `price` query parameter with every request.
    pub include_price_param: bool,
    pub request_timeout: Duration,
}

impl Config {
    pub fn new<P: Into<PathBuf>>(csv_file: P) -> Self {
        Self {
            csv_file: csv_file.into(),
            api_key: DEFAULT_API_KEY.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            rate_limit: Duration::from_secs_f64(DEFAULT_RATE_LIMIT_SECS),
            enable_mock_pricing: false,
            include_price_param: true,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_rate_limit_secs(self, secs: f64) -> Result<Self, ProcessorError> {
        Ok(self.with_rate_limit(parse_rate_limit(secs)?))
    }

    pub fn with_rate_limit(mut self, rate_limit: Duration) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn with_mock_pricing(mut self, enabled: bool) -> Self {
        self.enable_mock_pricing = enabled;
        self
    }

    pub fn with_price_param(mut self, enabled: bool) -> Self {
        self.include_price_param = enabled;
        self
    }
}

pub fn parse_rate_limit(secs: f64) -> Result<Duration, ProcessorError> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(ProcessorError::Config(format!(
            "rate limit must be a non-negative number of seconds, got {secs}"
        )));
    }

    Ok(Duration::from_secs_f64(secs))
}
