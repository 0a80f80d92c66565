//! Database connection pool

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Database connection pool type alias
pub type DbPool = PgPool;

/// Pool sizing and timeouts.
///
/// Defaults suit a single task-api instance; raise `max_connections`
/// when running several replicas against the same database.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    /// How long a request may wait for a free connection
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Create a connection pool with the given settings
pub async fn create_pool(
    database_url: &str,
    settings: &PoolSettings,
) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect(database_url)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = PoolSettings::default();
        assert_eq!(settings.max_connections, 10);
        assert_eq!(settings.acquire_timeout, Duration::from_secs(5));
    }
}
