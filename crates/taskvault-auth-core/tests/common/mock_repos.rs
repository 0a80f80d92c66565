//! Mock repositories for testing

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use taskvault_db::{
    CreateRefreshToken, CreateUser, DbResult, RefreshTokenRepository, RefreshTokenRow,
    UserRepository, UserRow,
};

/// In-memory user repository for testing
#[derive(Default, Clone)]
pub struct MockUserRepository {
    users: Arc<DashMap<Uuid, UserRow>>,
    by_email: Arc<DashMap<String, Uuid>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a test user directly
    #[allow(dead_code)]
    pub fn insert_user(&self, user: UserRow) {
        self.by_email.insert(user.email.clone(), user.id);
        self.users.insert(user.id, user);
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>> {
        Ok(self.users.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        Ok(self
            .by_email
            .get(email)
            .and_then(|id| self.users.get(id.value()).map(|r| r.value().clone())))
    }

    async fn create(&self, user: CreateUser) -> DbResult<UserRow> {
        let row = UserRow {
            id: user.id,
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.by_email.insert(row.email.clone(), row.id);
        self.users.insert(row.id, row.clone());
        Ok(row)
    }
}

/// In-memory refresh token repository for testing
#[derive(Default, Clone)]
pub struct MockRefreshTokenRepository {
    tokens: Arc<DashMap<String, RefreshTokenRow>>,
}

impl MockRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a token row directly, bypassing the service
    #[allow(dead_code)]
    pub fn insert_token(&self, row: RefreshTokenRow) {
        self.tokens.insert(row.token.clone(), row);
    }

    /// Number of stored token records
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Peek at a stored record without the expiry filter
    #[allow(dead_code)]
    pub fn get_raw(&self, token: &str) -> Option<RefreshTokenRow> {
        self.tokens.get(token).map(|r| r.value().clone())
    }

    /// Drop a record directly, simulating out-of-band invalidation
    #[allow(dead_code)]
    pub fn remove_token(&self, token: &str) {
        self.tokens.remove(token);
    }
}

#[async_trait]
impl RefreshTokenRepository for MockRefreshTokenRepository {
    async fn create(&self, token: CreateRefreshToken) -> DbResult<RefreshTokenRow> {
        let row = RefreshTokenRow {
            id: token.id,
            token: token.token.clone(),
            user_id: token.user_id,
            expires_at: token.expires_at,
            created_at: Utc::now(),
        };
        self.tokens.insert(token.token, row.clone());
        Ok(row)
    }

    async fn find_by_token(&self, token: &str) -> DbResult<Option<RefreshTokenRow>> {
        // Mirror the SQL: expired records are invisible
        Ok(self
            .tokens
            .get(token)
            .filter(|r| r.expires_at > Utc::now())
            .map(|r| r.value().clone()))
    }

    async fn delete_by_token(&self, token: &str) -> DbResult<u64> {
        Ok(self.tokens.remove(token).map(|_| 1).unwrap_or(0))
    }

    async fn delete_expired(&self) -> DbResult<u64> {
        let now = Utc::now();
        let doomed: Vec<String> = self
            .tokens
            .iter()
            .filter(|r| r.expires_at < now)
            .map(|r| r.token.clone())
            .collect();
        let count = doomed.len() as u64;
        for token in doomed {
            self.tokens.remove(&token);
        }
        Ok(count)
    }
}
