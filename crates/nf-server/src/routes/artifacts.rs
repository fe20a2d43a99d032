//! Artifact serving.
//!
//! An artifact's name is stable but its existence is not (files can be
//! cleaned up out-of-band), so responses carry cache-defeating headers:
//! a cached copy of a since-deleted artifact would contradict what the
//! listing endpoint reports.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use tokio_util::io::ReaderStream;

use crate::context::AppContext;
use crate::error::AppError;
use crate::storage::sanitize_file_name;

/// GET /api/artifacts/{name}
///
/// Streams one artifact file by name. The name is reduced to its final path
/// component before resolution, so requests cannot escape the artifact
/// directory. Direct fetch does not consult the registry checker; a missing
/// file is simply 404.
#[utoipa::path(
    get,
    path = "/api/artifacts/{name}",
    params(("name" = String, Path, description = "Artifact file name")),
    responses(
        (status = 200, description = "Artifact bytes"),
        (status = 404, description = "No such artifact")
    )
)]
pub async fn serve_artifact(
    State(ctx): State<AppContext>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let file_name = sanitize_file_name(&name)
        .ok_or_else(|| nf_core::Error::Validation(format!("invalid artifact name: {name:?}")))?;

    let path = ctx.config.storage.artifact_dir.join(&file_name);

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| nf_core::Error::not_found("artifact", &file_name))?;

    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    Ok((
        StatusCode::OK,
        [
            (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
            (header::PRAGMA, "no-cache"),
            (header::CONTENT_TYPE, content_type_for(&file_name)),
        ],
        body,
    ))
}

/// Content type by artifact extension.
fn content_type_for(name: &str) -> &'static str {
    match name.rsplit_once('.').map(|(_, ext)| ext) {
        Some("xml") => "application/xml",
        Some("mid") => "audio/midi",
        _ => "application/octet-stream",
    }
}
