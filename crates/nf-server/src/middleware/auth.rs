//! Authentication middleware.
//!
//! Validates bearer tokens against the session store (or the configured API
//! key) and injects the authenticated [`UserId`] into request extensions so
//! that downstream handlers can access it. When auth is disabled every
//! request resolves to the anonymous user.

use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use nf_core::UserId;
use nf_db::pool::DbPool;

use crate::context::AppContext;

/// Well-known user ID for unauthenticated requests (auth disabled).
const ANONYMOUS_USER_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Resolve the anonymous user ID.
pub fn anonymous_user() -> UserId {
    ANONYMOUS_USER_ID
        .parse()
        .expect("static anonymous UUID is valid")
}

/// Validate an auth token from raw header values.
///
/// Returns `Some(UserId)` on success, `None` on failure. Token resolution
/// order: configured API key first, then session tokens from the database.
pub fn validate_auth_headers(
    auth_config: &nf_core::config::AuthConfig,
    db: &DbPool,
    authorization: Option<&str>,
) -> Option<UserId> {
    // If auth is not enabled, return anonymous user.
    if !auth_config.enabled {
        return Some(anonymous_user());
    }

    let token = authorization?.strip_prefix("Bearer ")?;

    // Check against config API key.
    if let Some(ref api_key) = auth_config.api_key {
        if token == api_key {
            return Some(anonymous_user());
        }
    }

    // Check against DB session tokens.
    if let Ok(conn) = nf_db::pool::get_conn(db) {
        if let Ok(Some(tok)) = nf_db::queries::auth::get_token(&conn, token) {
            return Some(tok.user_id);
        }
    }

    None
}

/// Authentication middleware. Applied to protected routes only.
///
/// On success, inserts the resolved [`UserId`] into request extensions.
pub async fn auth_middleware(
    State(ctx): State<AppContext>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let authorization = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_owned());

    match validate_auth_headers(&ctx.config.auth, &ctx.db, authorization.as_deref()) {
        Some(user_id) => {
            request.extensions_mut().insert(user_id);
            Ok(next.run(request).await)
        }
        None => Err((StatusCode::UNAUTHORIZED, "Authentication required").into_response()),
    }
}
