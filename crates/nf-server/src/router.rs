//! Axum router construction.
//!
//! Builds the full application router with all route groups, middleware
//! layers, and static file serving.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::context::AppContext;
use crate::middleware::auth::auth_middleware;
use crate::routes;

/// Maximum accepted upload size: 50 MiB.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::auth::register,
        routes::auth::login,
        routes::auth::logout,
        routes::auth::auth_status,
        routes::convert::submit_conversion,
        routes::conversions::list_conversions,
        routes::artifacts::serve_artifact,
        routes::admin::tools,
    ),
    components(schemas(
        routes::auth::CredentialsRequest,
        routes::auth::AuthResponse,
        routes::auth::AuthStatusResponse,
        routes::convert::ConversionResponse,
        routes::conversions::ConversionListEntry,
        nf_core::MediaKind,
        nf_core::ArtifactSet,
        nf_engine::ToolInfo,
    ))
)]
struct ApiDoc;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Auth routes -- always accessible.
    let auth_routes = Router::new()
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/auth/status", get(routes::auth::auth_status));

    // Protected API routes.
    let protected_routes = Router::new()
        .route(
            "/convert",
            post(routes::convert::submit_conversion)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/conversions", get(routes::conversions::list_conversions))
        .route("/artifacts/{name}", get(routes::artifacts::serve_artifact))
        .route("/admin/tools", get(routes::admin::tools));

    // Always apply auth middleware -- it handles both enabled (validates
    // credentials) and disabled (injects anonymous UserId) modes. Without
    // this, Extension<UserId> extractors would fail with 500 when auth is
    // disabled.
    let protected_routes =
        protected_routes.layer(middleware::from_fn_with_state(ctx.clone(), auth_middleware));

    // Combine auth and protected under /api.
    let api = auth_routes.merge(protected_routes);

    let mut app = Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api)
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    // Static file serving for UI build.
    if let Some(dir) = static_dir {
        if dir.exists() {
            tracing::info!("Serving static files from {:?}", dir);
            let index_path = dir.join("index.html");
            app = app.fallback_service(
                tower_http::services::ServeDir::new(&dir)
                    .append_index_html_on_directories(true)
                    .not_found_service(tower_http::services::ServeFile::new(index_path)),
            );
        }
    }

    app
}
