//! Conversion dispatch: run the matching engine and name the result.
//!
//! `convert` is a pure orchestration step between a stored input file and an
//! artifact set. It performs no registry mutation and no response
//! formatting; a single engine failure is terminal for the request.

use std::path::Path;

use nf_core::{ArtifactSet, MediaKind, StoredFile};

use crate::engine::EngineSet;

/// Suffix basic-pitch appends to the input stem when naming its MIDI export.
const BASIC_PITCH_SUFFIX: &str = "_basic_pitch";

/// The audio extension the legacy naming rule substitutes.
const WAV_EXT: &str = ".wav";

/// Result of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutput {
    /// Base name shared by every file in the artifact set.
    pub base_name: String,
    /// The derived artifact file names.
    pub artifacts: ArtifactSet,
}

/// Run the engine for `kind` against `stored`, writing into `output_dir`.
///
/// The output directory is created if absent. On success the artifact base
/// name is derived from the stored file's name and the full artifact set is
/// recomputed from it; on failure the engine's typed error is returned
/// unchanged. No retry is attempted.
pub async fn convert(
    engines: &EngineSet,
    stored: &StoredFile,
    kind: MediaKind,
    output_dir: &Path,
) -> nf_core::Result<ConversionOutput> {
    std::fs::create_dir_all(output_dir)?;

    let engine = engines.engine_for(kind);
    engine.run(&stored.path, output_dir).await?;

    let base_name = artifact_base_name(&stored.name, kind);
    let artifacts = ArtifactSet::derive(&base_name, kind);

    tracing::debug!(
        "conversion of {} produced artifact base {:?}",
        stored.name,
        base_name
    );

    Ok(ConversionOutput {
        base_name,
        artifacts,
    })
}

/// Derive the artifact base name from a stored input name.
///
/// Image inputs drop their extension (`page.png` -> `page`). Audio inputs
/// substitute a trailing `.wav` with the basic-pitch suffix
/// (`song.wav` -> `song_basic_pitch`); a name without that extension keeps
/// the suffix concatenated onto the whole name rather than failing, matching
/// the engine's own output naming.
pub fn artifact_base_name(stored_name: &str, kind: MediaKind) -> String {
    match kind {
        MediaKind::Image => match stored_name.rsplit_once('.') {
            Some((stem, _ext)) if !stem.is_empty() => stem.to_string(),
            _ => stored_name.to_string(),
        },
        MediaKind::Audio => match stored_name.strip_suffix(WAV_EXT) {
            Some(stem) => format!("{stem}{BASIC_PITCH_SUFFIX}"),
            None => format!("{stored_name}{BASIC_PITCH_SUFFIX}"),
        },
    }
}
