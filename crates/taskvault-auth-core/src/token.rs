//! JWT signing and verification for the access/refresh token pair

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use taskvault_types::UserId;

use crate::{AuthConfig, AuthError};

/// Claims carried by both access and refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User email
    pub email: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Unique token id. Two tokens issued in the same second would
    /// otherwise be byte-identical, colliding in the token store.
    pub jti: String,
}

impl Claims {
    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Parse the subject as a UserId
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        UserId::parse(&self.sub).map_err(|_| AuthError::InvalidToken)
    }
}

/// Signs and verifies the two token kinds.
///
/// Access and refresh tokens use distinct secrets, so a token of one
/// kind never verifies as the other.
#[derive(Clone)]
pub struct TokenCodec {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_lifetime_secs: i64,
    refresh_lifetime_secs: i64,
}

impl TokenCodec {
    /// Create a codec from the auth config
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            access_lifetime_secs: config.access_token_lifetime.as_secs() as i64,
            refresh_lifetime_secs: config.refresh_token_lifetime.as_secs() as i64,
        }
    }

    /// Sign a new access token
    pub fn issue_access(&self, user_id: UserId, email: &str) -> Result<String, AuthError> {
        self.issue(user_id, email, &self.access_encoding, self.access_lifetime_secs)
    }

    /// Sign a new refresh token
    pub fn issue_refresh(&self, user_id: UserId, email: &str) -> Result<String, AuthError> {
        self.issue(user_id, email, &self.refresh_encoding, self.refresh_lifetime_secs)
    }

    /// Verify an access token and return its claims
    pub fn verify_access(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify(token, &self.access_decoding)
    }

    /// Verify a refresh token's signature and expiry.
    ///
    /// This is only the cryptographic half; callers must also confirm a
    /// live store record before trusting the token.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify(token, &self.refresh_decoding)
    }

    fn issue(
        &self,
        user_id: UserId,
        email: &str,
        key: &EncodingKey,
        lifetime_secs: i64,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now,
            exp: now + lifetime_secs,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, key).map_err(|e| {
            tracing::error!("Failed to sign token: {}", e);
            AuthError::Internal("failed to sign token".to_string())
        })
    }

    fn verify(&self, token: &str, key: &DecodingKey) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);

        let data = decode::<Claims>(token, key, &validation).map_err(|e| {
            tracing::debug!("Token verification failed: {}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            }
        })?;

        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(&AuthConfig::new("access-secret", "refresh-secret"))
    }

    #[test]
    fn test_access_round_trip() {
        let codec = codec();
        let user_id = UserId::new();

        let token = codec.issue_access(user_id, "user@example.com").unwrap();
        let claims = codec.verify_access(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert!(!claims.is_expired());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_round_trip() {
        let codec = codec();
        let user_id = UserId::new();

        let token = codec.issue_refresh(user_id, "user@example.com").unwrap();
        let claims = codec.verify_refresh(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn test_back_to_back_tokens_are_distinct() {
        let codec = codec();
        let user_id = UserId::new();

        let first = codec.issue_refresh(user_id, "user@example.com").unwrap();
        let second = codec.issue_refresh(user_id, "user@example.com").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_kinds_do_not_cross_verify() {
        let codec = codec();
        let user_id = UserId::new();

        let access = codec.issue_access(user_id, "user@example.com").unwrap();
        let refresh = codec.issue_refresh(user_id, "user@example.com").unwrap();

        assert!(matches!(
            codec.verify_refresh(&access),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            codec.verify_access(&refresh),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_is_distinguished() {
        let codec = codec();
        let now = Utc::now().timestamp();

        // Hand-build an already-expired token with the right secret
        let claims = Claims {
            sub: UserId::new().to_string(),
            email: "user@example.com".to_string(),
            iat: now - 7200,
            exp: now - 3600,
            jti: uuid::Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"access-secret"),
        )
        .unwrap();

        assert!(matches!(
            codec.verify_access(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let codec = codec();

        assert!(matches!(
            codec.verify_access("not-a-token"),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            codec.verify_access(""),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let codec = codec();
        let token = codec
            .issue_access(UserId::new(), "user@example.com")
            .unwrap();

        let mut tampered = token.clone();
        tampered.pop();

        assert!(matches!(
            codec.verify_access(&tampered),
            Err(AuthError::InvalidToken)
        ));
    }
}
