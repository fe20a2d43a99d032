//! Registry consistency checking.
//!
//! Artifact files can disappear out-of-band (disk cleanup, a partial failure
//! in an earlier conversion) while the lightweight conversion record
//! persists. Exposing such a record would hand the client a broken download
//! link, so every listing re-derives each record's artifact set and keeps
//! only records whose files all still exist. This trades a per-listing
//! filesystem scan for link integrity.

use std::path::Path;

use nf_core::ArtifactSet;
use nf_db::models::Conversion;

/// Filter `records` down to those whose full artifact set exists on disk.
///
/// The filter is stable: surviving records keep their input order. Storage
/// errors during an existence check (e.g. permission denial) count as
/// "does not exist" for that record; listing never propagates a hard error.
pub fn list_valid(records: Vec<Conversion>, artifact_dir: &Path) -> Vec<Conversion> {
    records
        .into_iter()
        .filter(|record| {
            let set = ArtifactSet::derive(&record.artifact_base_name, record.media_kind);
            let complete = set
                .iter()
                .all(|name| file_exists(&artifact_dir.join(name)));
            if !complete {
                tracing::debug!(
                    "omitting conversion {} from listing: artifact set incomplete",
                    record.id
                );
            }
            complete
        })
        .collect()
}

/// Existence check that folds storage errors into `false`.
fn file_exists(path: &Path) -> bool {
    std::fs::metadata(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf_core::{ConversionId, MediaKind, UserId};

    fn record(base: &str, kind: MediaKind) -> Conversion {
        Conversion {
            id: ConversionId::new(),
            owner: UserId::new(),
            display_name: base.to_string(),
            stored_input_name: format!("{base}.src"),
            artifact_base_name: base.to_string(),
            media_kind: kind,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn write_set(dir: &Path, base: &str, kind: MediaKind) {
        for name in ArtifactSet::derive(base, kind).iter() {
            std::fs::write(dir.join(name), b"artifact").unwrap();
        }
    }

    #[test]
    fn complete_records_survive() {
        let dir = tempfile::tempdir().unwrap();
        write_set(dir.path(), "page", MediaKind::Image);
        write_set(dir.path(), "song_basic_pitch", MediaKind::Audio);

        let records = vec![
            record("page", MediaKind::Image),
            record("song_basic_pitch", MediaKind::Audio),
        ];
        let valid = list_valid(records.clone(), dir.path());
        assert_eq!(valid, records);
    }

    #[test]
    fn missing_primary_excludes_record() {
        let dir = tempfile::tempdir().unwrap();
        write_set(dir.path(), "page", MediaKind::Image);
        std::fs::remove_file(dir.path().join("page.xml")).unwrap();

        let valid = list_valid(vec![record("page", MediaKind::Image)], dir.path());
        assert!(valid.is_empty());
    }

    #[test]
    fn missing_companion_excludes_record() {
        let dir = tempfile::tempdir().unwrap();
        write_set(dir.path(), "page", MediaKind::Image);
        std::fs::remove_file(dir.path().join("page.omr")).unwrap();

        let valid = list_valid(vec![record("page", MediaKind::Image)], dir.path());
        assert!(valid.is_empty());
    }

    #[test]
    fn deletion_never_affects_sibling_records() {
        let dir = tempfile::tempdir().unwrap();
        write_set(dir.path(), "a", MediaKind::Image);
        write_set(dir.path(), "b", MediaKind::Image);
        std::fs::remove_file(dir.path().join("a.xml")).unwrap();

        let records = vec![record("a", MediaKind::Image), record("b", MediaKind::Image)];
        let valid = list_valid(records, dir.path());
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].artifact_base_name, "b");
    }

    #[test]
    fn filter_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        for base in ["c", "a", "b"] {
            write_set(dir.path(), base, MediaKind::Audio);
        }

        let records = vec![
            record("c", MediaKind::Audio),
            record("a", MediaKind::Audio),
            record("b", MediaKind::Audio),
        ];
        let order: Vec<String> = list_valid(records, dir.path())
            .into_iter()
            .map(|r| r.artifact_base_name)
            .collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn listing_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write_set(dir.path(), "page", MediaKind::Image);

        let records = vec![
            record("page", MediaKind::Image),
            record("gone", MediaKind::Image),
        ];
        let first = list_valid(records.clone(), dir.path());
        let second = list_valid(records, dir.path());
        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_valid(Vec::new(), dir.path()).is_empty());
    }
}
