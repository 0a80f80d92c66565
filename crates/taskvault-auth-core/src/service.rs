//! Auth service - ties together token signing, password checks, and the
//! refresh token store

use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use taskvault_db::{CreateRefreshToken, CreateUser, RefreshTokenRepository, UserRepository};
use taskvault_types::{PublicUser, UserId};

use crate::{
    config::AuthConfig,
    password::{hash_password, verify_password},
    token::TokenCodec,
    AuthError,
};

/// Registration input
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Login input
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// A freshly established session: both tokens plus the user they belong to
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: PublicUser,
    pub access_token: String,
    pub refresh_token: String,
    /// When the stored refresh token record expires
    pub refresh_expires_at: DateTime<Utc>,
}

/// Result of a successful refresh: a new access token only.
///
/// The refresh token is not rotated; the caller keeps using the one it
/// presented.
#[derive(Debug, Clone)]
pub struct RefreshedSession {
    pub user: PublicUser,
    pub access_token: String,
}

/// Identity attached to a request after access token verification
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub email: String,
}

/// Authentication service
///
/// Provides the full session protocol:
/// - register / login (issue an access + refresh pair)
/// - refresh (mint a new access token against a stored refresh token)
/// - logout (invalidate the stored refresh token)
/// - authenticate (verify an access token on each request)
pub struct AuthService<U: UserRepository, R: RefreshTokenRepository> {
    config: AuthConfig,
    codec: TokenCodec,
    user_repo: Arc<U>,
    refresh_repo: Arc<R>,
}

impl<U: UserRepository, R: RefreshTokenRepository> AuthService<U, R> {
    /// Create a new auth service
    pub fn new(config: AuthConfig, user_repo: Arc<U>, refresh_repo: Arc<R>) -> Self {
        Self {
            codec: TokenCodec::new(&config),
            config,
            user_repo,
            refresh_repo,
        }
    }

    /// Refresh token lifetime, for cookie Max-Age
    pub fn refresh_token_lifetime(&self) -> std::time::Duration {
        self.config.refresh_token_lifetime
    }

    // =========================================================================
    // Registration and Login
    // =========================================================================

    /// Register a new user.
    ///
    /// No tokens are issued; the caller logs in separately to open a
    /// session.
    pub async fn register(&self, input: RegisterInput) -> Result<PublicUser, AuthError> {
        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(&input.password).await?;

        let new_user = CreateUser {
            id: Uuid::new_v4(),
            email: input.email,
            password_hash,
            name: input.name,
        };

        // A concurrent register can still hit the unique constraint
        let user = self.user_repo.create(new_user).await.map_err(|e| {
            if e.is_unique_violation() {
                AuthError::EmailTaken
            } else {
                AuthError::from(e)
            }
        })?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user.to_public())
    }

    /// Log in with email and password.
    ///
    /// Unknown email and wrong password produce the same error, so a
    /// caller cannot probe which addresses are registered.
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self
            .user_repo
            .find_by_email(&input.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let ok = verify_password(&input.password, &user.password_hash).await?;
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "user logged in");
        self.open_session(&user).await
    }

    /// Issue a token pair and persist the refresh token
    async fn open_session(&self, user: &taskvault_db::UserRow) -> Result<AuthSession, AuthError> {
        let user_id = user.user_id();
        let access_token = self.codec.issue_access(user_id, &user.email)?;
        let refresh_token = self.codec.issue_refresh(user_id, &user.email)?;

        let lifetime = chrono::Duration::from_std(self.config.refresh_token_lifetime)
            .map_err(|e| AuthError::Configuration(format!("refresh lifetime out of range: {e}")))?;
        let expires_at = Utc::now() + lifetime;

        self.refresh_repo
            .create(CreateRefreshToken {
                id: Uuid::new_v4(),
                token: refresh_token.clone(),
                user_id: user.id,
                expires_at,
            })
            .await?;

        Ok(AuthSession {
            user: user.to_public(),
            access_token,
            refresh_token,
            refresh_expires_at: expires_at,
        })
    }

    // =========================================================================
    // Refresh and Logout
    // =========================================================================

    /// Exchange a refresh token for a new access token.
    ///
    /// The token must both verify cryptographically and have a live
    /// record in the store; a logged-out token fails here even though
    /// its signature is still good. The stored record is left untouched.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedSession, AuthError> {
        let claims = self.codec.verify_refresh(refresh_token)?;

        self.refresh_repo
            .find_by_token(refresh_token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let user_id = claims.user_id()?;
        let user = self
            .user_repo
            .find_by_id(user_id.0)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let access_token = self.codec.issue_access(user_id, &user.email)?;

        Ok(RefreshedSession {
            user: user.to_public(),
            access_token,
        })
    }

    /// Invalidate a refresh token.
    ///
    /// Idempotent and never fails observably: an unknown token and a
    /// store error both end the session from the caller's point of
    /// view. Store errors are logged.
    pub async fn logout(&self, refresh_token: &str) {
        match self.refresh_repo.delete_by_token(refresh_token).await {
            Ok(removed) => tracing::debug!(removed, "logout"),
            Err(e) => tracing::error!(error = %e, "logout could not reach the token store"),
        }
    }

    /// Remove expired refresh token records
    pub async fn purge_expired_tokens(&self) -> Result<u64, AuthError> {
        Ok(self.refresh_repo.delete_expired().await?)
    }

    // =========================================================================
    // Request Authentication
    // =========================================================================

    /// Verify an access token and return the identity it carries.
    ///
    /// Pure token verification; no database round trip on the request
    /// hot path.
    pub fn authenticate(&self, access_token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.codec.verify_access(access_token)?;
        let user_id = claims.user_id()?;

        Ok(AuthenticatedUser {
            user_id,
            email: claims.email,
        })
    }

    /// Load the public profile for an authenticated user
    pub async fn current_user(&self, user_id: UserId) -> Result<PublicUser, AuthError> {
        let user = self
            .user_repo
            .find_by_id(user_id.0)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user.to_public())
    }
}

impl<U: UserRepository, R: RefreshTokenRepository> std::fmt::Debug for AuthService<U, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("config", &self.config)
            .finish()
    }
}
