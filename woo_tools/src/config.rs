use std::time::Duration;

use dpa_common::Secret;

use crate::WooApiError;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct WooConfig {
    /// The base url of the WordPress site, e.g. "https://my-market.example". The `/wp-json/...` part is added by the
    /// client.
    pub api_url: String,
    pub username: String,
    pub password: Secret<String>,
    /// Upper bound on any single request. A stalled store must never stall the poller forever.
    pub request_timeout: Duration,
}

impl Default for WooConfig {
    fn default() -> Self {
        Self {
            api_url: String::default(),
            username: String::default(),
            password: Secret::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl WooConfig {
    pub fn new(api_url: &str, username: &str, password: &str) -> Self {
        Self {
            api_url: api_url.trim().to_string(),
            username: username.trim().to_string(),
            password: Secret::new(password.to_string()),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), WooApiError> {
        let mut missing = vec![];
        if self.api_url.trim().is_empty() {
            missing.push("api url");
        }
        if self.username.trim().is_empty() {
            missing.push("username");
        }
        if self.password.is_blank() {
            missing.push("password");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(WooApiError::Initialization(format!("Missing store credentials: {}", missing.join(", "))))
        }
    }
}
