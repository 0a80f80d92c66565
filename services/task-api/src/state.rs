//! Application state

use std::ops::Deref;
use std::sync::Arc;

use taskvault_auth_core::AuthService;
use taskvault_db::pg::{PgRefreshTokenRepository, PgUserRepository, Repositories};
use taskvault_db::DbPool;

use crate::config::Config;

/// Type alias for the auth service with concrete repository types
pub type AuthServiceImpl = AuthService<PgUserRepository, PgRefreshTokenRepository>;

/// Shared database pool wrapper for health checks
#[derive(Clone)]
pub struct SharedPool(Arc<DbPool>);

impl Deref for SharedPool {
    type Target = DbPool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Auth service for the session protocol and request authentication
    pub auth: Arc<AuthServiceImpl>,
    /// Database repositories
    pub repos: Repositories,
    /// Database connection pool (shared reference for health checks)
    pub pool: SharedPool,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config, pool: DbPool) -> Self {
        let repos = Repositories::new(pool.clone());
        let auth = AuthService::new(
            config.auth.clone(),
            Arc::new(repos.users.clone()),
            Arc::new(repos.refresh_tokens.clone()),
        );

        Self {
            auth: Arc::new(auth),
            repos,
            pool: SharedPool(Arc::new(pool)),
            config: Arc::new(config),
        }
    }
}
