//! Conversion listing endpoint.

use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;

use nf_core::{ArtifactSet, MediaKind, UserId};
use nf_db::models::Conversion;

use crate::context::AppContext;
use crate::error::AppError;
use crate::registry;

/// One listed conversion, with its artifact names recomputed.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ConversionListEntry {
    pub id: String,
    pub display_name: String,
    pub stored_input_name: String,
    pub artifact_base_name: String,
    pub media_kind: MediaKind,
    pub artifacts: ArtifactSet,
    pub created_at: String,
}

impl ConversionListEntry {
    fn from_record(record: Conversion) -> Self {
        let artifacts = ArtifactSet::derive(&record.artifact_base_name, record.media_kind);
        Self {
            id: record.id.to_string(),
            display_name: record.display_name,
            stored_input_name: record.stored_input_name,
            artifact_base_name: record.artifact_base_name,
            media_kind: record.media_kind,
            artifacts,
            created_at: record.created_at,
        }
    }
}

/// GET /api/conversions
///
/// Returns the caller's conversion records, oldest first, filtered to those
/// whose artifact files all still exist. Records whose artifacts were
/// removed out-of-band are silently omitted rather than failing the listing.
#[utoipa::path(
    get,
    path = "/api/conversions",
    responses(
        (status = 200, description = "The caller's valid conversions",
         body = Vec<ConversionListEntry>)
    )
)]
pub async fn list_conversions(
    State(ctx): State<AppContext>,
    Extension(owner): Extension<UserId>,
) -> Result<Json<Vec<ConversionListEntry>>, AppError> {
    let conn = nf_db::pool::get_conn(&ctx.db)?;
    let records = nf_db::queries::conversions::list_conversions_by_owner(&conn, owner)?;
    drop(conn);

    let valid = registry::list_valid(records, &ctx.config.storage.artifact_dir);

    Ok(Json(
        valid.into_iter().map(ConversionListEntry::from_record).collect(),
    ))
}
