//! Conversion submission endpoint.
//!
//! Admission happens entirely at this boundary: a missing or empty file
//! part, or a missing media kind, is rejected with 400 before any storage or
//! engine work starts. The conversion record is appended only after the
//! dispatcher reports success, so a failed or aborted run never becomes
//! visible in the registry.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Serialize;

use nf_core::{ArtifactSet, MediaKind, UserId};

use crate::context::AppContext;
use crate::error::AppError;
use crate::storage::sanitize_file_name;

/// Response for a successful conversion.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ConversionResponse {
    pub id: String,
    pub display_name: String,
    pub stored_input_name: String,
    pub artifact_base_name: String,
    pub media_kind: MediaKind,
    pub artifacts: ArtifactSet,
    pub created_at: String,
}

/// One parsed multipart submission.
struct Submission {
    data: Vec<u8>,
    file_name: Option<String>,
    kind: Option<String>,
    display_name: Option<String>,
}

/// Pull the expected parts out of the multipart stream.
async fn read_submission(mut multipart: Multipart) -> Result<Submission, AppError> {
    let mut submission = Submission {
        data: Vec::new(),
        file_name: None,
        kind: None,
        display_name: None,
    };
    let mut saw_file = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| nf_core::Error::Validation(format!("malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => {
                saw_file = true;
                submission.file_name = field.file_name().map(|s| s.to_string());
                submission.data = field
                    .bytes()
                    .await
                    .map_err(|e| {
                        nf_core::Error::Validation(format!("failed to read file part: {e}"))
                    })?
                    .to_vec();
            }
            Some("kind") => {
                submission.kind = Some(field.text().await.map_err(|e| {
                    nf_core::Error::Validation(format!("failed to read kind field: {e}"))
                })?);
            }
            Some("name") => {
                submission.display_name = Some(field.text().await.map_err(|e| {
                    nf_core::Error::Validation(format!("failed to read name field: {e}"))
                })?);
            }
            _ => {
                // Unknown parts are ignored.
            }
        }
    }

    if !saw_file {
        return Err(nf_core::Error::Validation("file part is required".into()).into());
    }
    if submission.data.is_empty() {
        return Err(nf_core::Error::Validation("file part is empty".into()).into());
    }

    Ok(submission)
}

/// POST /api/convert
#[utoipa::path(
    post,
    path = "/api/convert",
    request_body(content = Vec<u8>, content_type = "multipart/form-data",
        description = "file (binary), kind (image|audio), optional name"),
    responses(
        (status = 201, description = "Conversion complete", body = ConversionResponse),
        (status = 400, description = "Missing or invalid submission"),
        (status = 502, description = "Conversion engine failed"),
        (status = 504, description = "Conversion engine timed out")
    )
)]
pub async fn submit_conversion(
    State(ctx): State<AppContext>,
    Extension(owner): Extension<UserId>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let submission = read_submission(multipart).await?;

    let kind: MediaKind = submission
        .kind
        .as_deref()
        .ok_or_else(|| nf_core::Error::Validation("kind field is required".into()))?
        .parse()
        .map_err(|e: String| nf_core::Error::Validation(e))?;

    let upload_name = submission
        .file_name
        .as_deref()
        .and_then(sanitize_file_name)
        .ok_or_else(|| nf_core::Error::Validation("file part has no usable name".into()))?;

    let stored = ctx.uploads.store(
        &ctx.config.storage.upload_dir,
        &upload_name,
        &submission.data,
    )?;

    tracing::info!("admitted {} as {} ({kind})", upload_name, stored.name);

    let output =
        nf_engine::convert(&ctx.engines, &stored, kind, &ctx.config.storage.artifact_dir).await?;

    let display_name = submission
        .display_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| upload_name.clone());

    let conn = nf_db::pool::get_conn(&ctx.db)?;
    let record = nf_db::queries::conversions::append_conversion(
        &conn,
        owner,
        &display_name,
        &stored.name,
        &output.base_name,
        kind,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(ConversionResponse {
            id: record.id.to_string(),
            display_name: record.display_name,
            stored_input_name: record.stored_input_name,
            artifact_base_name: record.artifact_base_name,
            media_kind: record.media_kind,
            artifacts: output.artifacts,
            created_at: record.created_at,
        }),
    ))
}
