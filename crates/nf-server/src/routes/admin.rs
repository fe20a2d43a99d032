//! Administrative endpoints.

use axum::extract::State;
use axum::Json;

use nf_engine::ToolInfo;

use crate::context::AppContext;

/// GET /api/admin/tools
///
/// Reports availability, version, and resolved path of the external
/// conversion engines.
#[utoipa::path(
    get,
    path = "/api/admin/tools",
    responses(
        (status = 200, description = "External tool availability", body = Vec<ToolInfo>)
    )
)]
pub async fn tools(State(ctx): State<AppContext>) -> Json<Vec<ToolInfo>> {
    Json(ctx.tools.check_all())
}
