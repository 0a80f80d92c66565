//! Configuration for the Task API service.

use taskvault_auth_core::{parse_lifetime, AuthConfig};

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Task API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub port: u16,

    /// Database URL
    pub database_url: String,

    /// Connection pool sizing and timeouts
    pub pool: taskvault_db::PoolSettings,

    /// Auth core configuration
    pub auth: AuthConfig,

    /// Deployment environment
    pub environment: Environment,

    /// Allowed CORS origin for the web client
    pub cors_origin: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In production both token secrets must be set explicitly; the
    /// development fallbacks exist only so a local checkout runs
    /// without a .env file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let environment = match std::env::var("APP_ENV").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        };

        let access_secret = token_secret(
            "ACCESS_TOKEN_SECRET",
            "default-access-secret",
            environment,
        )?;
        let refresh_secret = token_secret(
            "REFRESH_TOKEN_SECRET",
            "default-refresh-secret",
            environment,
        )?;

        let access_lifetime = std::env::var("ACCESS_TOKEN_LIFETIME")
            .unwrap_or_else(|_| "15m".to_string());
        let access_lifetime = parse_lifetime(&access_lifetime)
            .map_err(|_| ConfigError::Invalid("ACCESS_TOKEN_LIFETIME"))?;

        let refresh_lifetime = std::env::var("REFRESH_TOKEN_LIFETIME")
            .unwrap_or_else(|_| "7d".to_string());
        let refresh_lifetime = parse_lifetime(&refresh_lifetime)
            .map_err(|_| ConfigError::Invalid("REFRESH_TOKEN_LIFETIME"))?;

        let cors_origin = std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let mut pool = taskvault_db::PoolSettings::default();
        if let Ok(max) = std::env::var("DB_MAX_CONNECTIONS") {
            pool.max_connections = max
                .parse()
                .map_err(|_| ConfigError::Invalid("DB_MAX_CONNECTIONS"))?;
        }

        let auth = AuthConfig::new(access_secret, refresh_secret)
            .with_access_token_lifetime(access_lifetime)
            .with_refresh_token_lifetime(refresh_lifetime);

        Ok(Self {
            port,
            database_url,
            pool,
            auth,
            environment,
            cors_origin,
        })
    }

    /// Whether the service runs in production mode
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

/// Resolve a token secret, refusing to start production with a fallback
fn token_secret(
    var: &'static str,
    fallback: &str,
    environment: Environment,
) -> Result<String, ConfigError> {
    match std::env::var(var) {
        Ok(secret) if !secret.is_empty() => Ok(secret),
        _ if environment == Environment::Production => Err(ConfigError::Missing(var)),
        _ => {
            tracing::warn!("{} not set, using development fallback", var);
            Ok(fallback.to_string())
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
