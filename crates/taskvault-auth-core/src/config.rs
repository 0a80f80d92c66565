//! Configuration types for the auth service

use std::time::Duration;

use crate::AuthError;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Secret used to sign and verify access tokens
    pub access_secret: String,
    /// Secret used to sign and verify refresh tokens
    pub refresh_secret: String,
    /// Access token lifetime
    pub access_token_lifetime: Duration,
    /// Refresh token lifetime.
    ///
    /// Used both for the JWT exp claim and for the persisted record's
    /// expiry, so the two can never disagree.
    pub refresh_token_lifetime: Duration,
}

impl AuthConfig {
    /// Create a new auth config with default lifetimes (15m access, 7d refresh)
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_token_lifetime: Duration::from_secs(15 * 60),
            refresh_token_lifetime: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }

    /// Set access token lifetime
    pub fn with_access_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.access_token_lifetime = lifetime;
        self
    }

    /// Set refresh token lifetime
    pub fn with_refresh_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.refresh_token_lifetime = lifetime;
        self
    }
}

impl std::fmt::Debug for AuthConfig {
    // Secrets stay out of logs
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_token_lifetime", &self.access_token_lifetime)
            .field("refresh_token_lifetime", &self.refresh_token_lifetime)
            .finish_non_exhaustive()
    }
}

/// Parse a unit-suffixed lifetime string like "15m", "12h" or "7d".
///
/// Supported units: s, m, h, d.
pub fn parse_lifetime(s: &str) -> Result<Duration, AuthError> {
    let s = s.trim();
    let invalid = || AuthError::Configuration(format!("invalid lifetime: {s}"));

    // Suffix stripping stays on char boundaries whatever the input
    let (value, unit_secs) = if let Some(v) = s.strip_suffix('s') {
        (v, 1)
    } else if let Some(v) = s.strip_suffix('m') {
        (v, 60)
    } else if let Some(v) = s.strip_suffix('h') {
        (v, 60 * 60)
    } else if let Some(v) = s.strip_suffix('d') {
        (v, 24 * 60 * 60)
    } else {
        return Err(invalid());
    };

    let value: u64 = value.parse().map_err(|_| invalid())?;

    value
        .checked_mul(unit_secs)
        .map(Duration::from_secs)
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lifetime_units() {
        assert_eq!(parse_lifetime("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_lifetime("15m").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_lifetime("12h").unwrap(), Duration::from_secs(43_200));
        assert_eq!(parse_lifetime("7d").unwrap(), Duration::from_secs(604_800));
    }

    #[test]
    fn test_parse_lifetime_rejects_garbage() {
        assert!(parse_lifetime("15").is_err());
        assert!(parse_lifetime("m").is_err());
        assert!(parse_lifetime("").is_err());
        assert!(parse_lifetime("1.5h").is_err());
        assert!(parse_lifetime("15 m").is_err());
        assert!(parse_lifetime("-5m").is_err());
        // Multibyte suffixes take the error path, no char-boundary panic
        assert!(parse_lifetime("15分").is_err());
        assert!(parse_lifetime("分").is_err());
        // Values that would overflow the seconds conversion
        assert!(parse_lifetime("18446744073709551615d").is_err());
    }

    #[test]
    fn test_default_lifetimes() {
        let config = AuthConfig::new("access", "refresh");
        assert_eq!(config.access_token_lifetime, Duration::from_secs(900));
        assert_eq!(config.refresh_token_lifetime, Duration::from_secs(604_800));
    }
}
