//! Client configuration

use std::time::Duration;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, e.g. `http://localhost:5000`
    pub base_url: String,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Self {
            base_url,
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_stripped() {
        let config = ClientConfig::new("http://localhost:5000/");
        assert_eq!(config.base_url, "http://localhost:5000");

        let config = ClientConfig::new("http://localhost:5000");
        assert_eq!(config.base_url, "http://localhost:5000");
    }
}
