//! PostgreSQL repository implementations

mod refresh_token;
mod task;
mod user;

pub use refresh_token::PgRefreshTokenRepository;
pub use task::PgTaskRepository;
pub use user::PgUserRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub users: PgUserRepository,
    pub refresh_tokens: PgRefreshTokenRepository,
    pub tasks: PgTaskRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            refresh_tokens: PgRefreshTokenRepository::new(pool.clone()),
            tasks: PgTaskRepository::new(pool),
        }
    }
}
