//! Authentication handlers (register, login, refresh, logout, me)

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use taskvault_auth_core::{AuthError, LoginInput, RegisterInput};
use taskvault_types::PublicUser;

use crate::error::ApiResult;
use crate::extractors::{refresh_token_cookie, AuthUser, REFRESH_COOKIE};
use crate::response::ApiEnvelope;
use crate::state::AppState;
use crate::validation;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Auth payload: the user plus a fresh access token. The refresh token
/// travels only in the cookie, never in the body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    pub user: PublicUser,
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct UserData {
    pub user: PublicUser,
}

// ============================================================================
// Cookies
// ============================================================================

/// Build the Set-Cookie value carrying the refresh token
fn refresh_cookie(state: &AppState, token: &str) -> String {
    let max_age = state.auth.refresh_token_lifetime().as_secs();
    let mut cookie = format!(
        "{REFRESH_COOKIE}={token}; HttpOnly; SameSite=Strict; Path=/; Max-Age={max_age}"
    );
    if state.config.is_production() {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Expire the refresh cookie immediately
fn clear_refresh_cookie(state: &AppState) -> String {
    let mut cookie =
        format!("{REFRESH_COOKIE}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0");
    if state.config.is_production() {
        cookie.push_str("; Secure");
    }
    cookie
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/register
///
/// Create an account. No session is opened; the caller logs in next.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_register(&req.email, &req.password, &req.name)?;

    let user = state
        .auth
        .register(RegisterInput {
            email: req.email,
            password: req.password,
            name: req.name,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::with_message(
            "User registered successfully",
            UserData { user },
        )),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_login(&req.email, &req.password)?;

    let session = state
        .auth
        .login(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    let cookie = refresh_cookie(&state, &session.refresh_token);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(ApiEnvelope::with_message(
            "Login successful",
            AuthData {
                user: session.user,
                access_token: session.access_token,
            },
        )),
    ))
}

/// POST /api/auth/refresh
///
/// Exchange the refresh token cookie for a new access token. The
/// cookie is not rotated.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<ApiEnvelope<AuthData>>> {
    let token = refresh_token_cookie(&headers).ok_or(AuthError::MissingToken)?;

    let session = state.auth.refresh(&token).await?;

    Ok(Json(ApiEnvelope::data(AuthData {
        user: session.user,
        access_token: session.access_token,
    })))
}

/// POST /api/auth/logout
///
/// Invalidate the refresh token and clear its cookie. Succeeds even
/// when no cookie is present.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    if let Some(token) = refresh_token_cookie(&headers) {
        state.auth.logout(&token).await;
    }

    let cookie = clear_refresh_cookie(&state);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(ApiEnvelope::message("Logged out successfully")),
    ))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<ApiEnvelope<UserData>>> {
    let user = state.auth.current_user(auth_user.user_id).await?;

    Ok(Json(ApiEnvelope::data(UserData { user })))
}
