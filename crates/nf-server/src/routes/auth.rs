//! Authentication route handlers: register, login, logout, status.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::error::AppError;

/// Registration / login request payload.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Login/registration response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Auth status response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthStatusResponse {
    pub auth_enabled: bool,
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn register(
    State(ctx): State<AppContext>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.username.trim().is_empty() {
        return Err(nf_core::Error::Validation("username is required".into()).into());
    }
    if payload.password.is_empty() {
        return Err(nf_core::Error::Validation("password is required".into()).into());
    }

    let hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST)
        .map_err(|e| nf_core::Error::Internal(format!("bcrypt error: {e}")))?;

    let conn = nf_db::pool::get_conn(&ctx.db)?;
    let user = nf_db::queries::users::create_user(&conn, payload.username.trim(), &hash)?;

    tracing::info!("registered user {}", user.username);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "Account created".into(),
            token: None,
        }),
    ))
}

/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(ctx): State<AppContext>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let conn = nf_db::pool::get_conn(&ctx.db)?;

    let user = nf_db::queries::users::get_user_by_username(&conn, &payload.username)?
        .ok_or_else(|| nf_core::Error::Unauthorized("Invalid credentials".into()))?;

    let password_valid = bcrypt::verify(&payload.password, &user.password_hash).unwrap_or(false);
    if !password_valid {
        return Err(nf_core::Error::Unauthorized("Invalid credentials".into()).into());
    }

    let token = uuid::Uuid::new_v4().to_string();
    let expires = Utc::now() + Duration::hours(ctx.config.auth.session_timeout_hours as i64);

    nf_db::queries::auth::create_token(&conn, user.id, &token, &expires.to_rfc3339())?;

    Ok((
        StatusCode::OK,
        Json(AuthResponse {
            success: true,
            message: "Login successful".into(),
            token: Some(token),
        }),
    ))
}

/// POST /api/auth/logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out")
    )
)]
pub async fn logout(
    State(ctx): State<AppContext>,
    headers: axum::http::HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if let Some(token) = token {
        let conn = nf_db::pool::get_conn(&ctx.db)?;
        let _ = nf_db::queries::auth::delete_token(&conn, token);
    }

    Ok((
        StatusCode::OK,
        Json(AuthResponse {
            success: true,
            message: "Logged out".into(),
            token: None,
        }),
    ))
}

/// GET /api/auth/status
#[utoipa::path(
    get,
    path = "/api/auth/status",
    responses(
        (status = 200, description = "Authentication status", body = AuthStatusResponse)
    )
)]
pub async fn auth_status(
    State(ctx): State<AppContext>,
    headers: axum::http::HeaderMap,
) -> Json<AuthStatusResponse> {
    let authorization = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let user_id = crate::middleware::auth::validate_auth_headers(
        &ctx.config.auth,
        &ctx.db,
        authorization,
    );

    Json(AuthStatusResponse {
        auth_enabled: ctx.config.auth.enabled,
        authenticated: user_id.is_some(),
        user_id: user_id.map(|u| u.to_string()),
    })
}
