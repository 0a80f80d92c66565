//! PostgreSQL refresh token repository implementation

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::RefreshTokenRow;
use crate::repo::{CreateRefreshToken, RefreshTokenRepository};

/// PostgreSQL refresh token repository
#[derive(Clone)]
pub struct PgRefreshTokenRepository {
    pool: PgPool,
}

impl PgRefreshTokenRepository {
    /// Create a new refresh token repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    async fn create(&self, token: CreateRefreshToken) -> DbResult<RefreshTokenRow> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            INSERT INTO refresh_tokens (id, token, user_id, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, token, user_id, expires_at, created_at
            "#,
        )
        .bind(token.id)
        .bind(&token.token)
        .bind(token.user_id)
        .bind(token.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_token(&self, token: &str) -> DbResult<Option<RefreshTokenRow>> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT id, token, user_id, expires_at, created_at
            FROM refresh_tokens
            WHERE token = $1 AND expires_at > NOW()
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete_by_token(&self, token: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_expired(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
