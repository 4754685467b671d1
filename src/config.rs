//! Gateway configuration (layered: code > env > defaults).

use std::time::Duration;

use crate::auth::DEFAULT_TOKEN_TTL;

const DEFAULT_BASE_URL: &str = "https://api.remedia.app";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`EndpointGateway`](crate::gateway::EndpointGateway).
///
/// # Example
/// ```
/// use std::time::Duration;
/// use remedia::config::GatewayConfig;
///
/// let config = GatewayConfig::new("https://staging.remedia.app")
///     .with_request_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub token_ttl: Duration,
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            token_ttl: DEFAULT_TOKEN_TTL,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Load from environment variables (`REMEDIA_BASE_URL`,
    /// `REMEDIA_TIMEOUT_SECS`, `REMEDIA_TOKEN_TTL_SECS`), falling back to
    /// defaults. Reads `.env` if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let base_url =
            std::env::var("REMEDIA_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(base_url);
        if let Some(secs) = env_secs("REMEDIA_TIMEOUT_SECS") {
            config.request_timeout = secs;
        }
        if let Some(secs) = env_secs("REMEDIA_TOKEN_TTL_SECS") {
            config.token_ttl = secs;
        }
        config
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn env_secs(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = GatewayConfig::new("https://host")
            .with_request_timeout(Duration::from_secs(5))
            .with_token_ttl(Duration::from_secs(60));
        assert_eq!(config.base_url, "https://host");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.token_ttl, Duration::from_secs(60));
    }

    #[test]
    fn default_carries_tunable_constants() {
        let config = GatewayConfig::default();
        assert_eq!(config.token_ttl, DEFAULT_TOKEN_TTL);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }
}
