//! Axum extractors for authentication

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use taskvault_auth_core::AuthError;
use taskvault_types::UserId;

use crate::error::auth_message;
use crate::state::AppState;

/// Name of the cookie carrying the refresh token
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Authenticated user extracted from the Authorization header
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    pub email: String,
}

/// Error response for auth failures, in the standard error envelope
#[derive(Debug, Serialize)]
struct AuthErrorBody {
    success: bool,
    message: &'static str,
    code: &'static str,
}

/// Auth rejection type
pub struct AuthRejection {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
}

impl AuthRejection {
    fn from_auth_error(error: &AuthError) -> Self {
        Self {
            status: StatusCode::from_u16(error.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            code: error.error_code(),
            message: auth_message(error),
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let body = AuthErrorBody {
            success: false,
            message: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let app_state = AppState::from_ref(state);

            let token = bearer_token(parts)
                .ok_or_else(|| AuthRejection::from_auth_error(&AuthError::MissingToken))?;

            // Pure JWT verification, no database round trip
            let identity = app_state.auth.authenticate(&token).map_err(|e| {
                tracing::debug!(error = ?e, "Access token rejected");
                AuthRejection::from_auth_error(&e)
            })?;

            Ok(AuthUser {
                user_id: identity.user_id,
                email: identity.email,
            })
        })
    }
}

/// Pull the bearer token out of the Authorization header
fn bearer_token(parts: &Parts) -> Option<String> {
    let auth_header = parts.headers.get(header::AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    auth_str.strip_prefix("Bearer ").map(str::to_string)
}

/// Read the refresh token cookie from a request's headers
pub fn refresh_token_cookie(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?;
    let cookie_str = cookie_header.to_str().ok()?;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some(value) = cookie
            .strip_prefix(REFRESH_COOKIE)
            .and_then(|rest| rest.strip_prefix('='))
        {
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_refresh_cookie_found_among_others() {
        let headers = headers_with_cookie("theme=dark; refreshToken=abc123; lang=en");
        assert_eq!(refresh_token_cookie(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_refresh_cookie_alone() {
        let headers = headers_with_cookie("refreshToken=abc123");
        assert_eq!(refresh_token_cookie(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_refresh_cookie_missing() {
        let headers = headers_with_cookie("theme=dark");
        assert!(refresh_token_cookie(&headers).is_none());

        let headers = HeaderMap::new();
        assert!(refresh_token_cookie(&headers).is_none());
    }

    #[test]
    fn test_refresh_cookie_empty_value_is_none() {
        let headers = headers_with_cookie("refreshToken=");
        assert!(refresh_token_cookie(&headers).is_none());
    }
}
