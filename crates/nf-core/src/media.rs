//! Media-domain model: media kinds, stored files, and artifact sets.
//!
//! The artifact-set derivation here is the single source of truth for which
//! output files a conversion produces. Both the dispatcher (after running an
//! engine) and the registry consistency checker (when validating old records)
//! recompute the set from the same pure function, so the two can never
//! disagree about a record's expected files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Canonical extension of the notation file Audiveris exports.
pub const NOTATION_EXT: &str = "xml";

/// Extension of the Audiveris recognition intermediate (book) file.
pub const RECOGNITION_EXT: &str = "omr";

/// Extension of the MIDI file basic-pitch writes.
pub const MIDI_EXT: &str = "mid";

/// The kind of media a submission declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// A scanned sheet-music image, converted by optical music recognition.
    Image,
    /// An audio recording, converted by pitch transcription.
    Audio,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Audio => write!(f, "audio"),
        }
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(MediaKind::Image),
            "audio" => Ok(MediaKind::Audio),
            _ => Err(format!("unknown media kind: {s}")),
        }
    }
}

/// A file admitted to durable storage under a collision-free name.
///
/// Once created the file is never overwritten in place; a re-upload of the
/// same name produces a new `StoredFile` with a suffixed name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Absolute path of the stored file.
    pub path: PathBuf,
    /// File name within its directory (unique at the moment of creation).
    pub name: String,
}

/// The set of output file names a conversion produces.
///
/// Every name is a pure function of the artifact base name and the media
/// kind; no artifact name is ever chosen independently of this derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ArtifactSet {
    /// The primary notation file.
    pub primary: String,
    /// Companion files sharing the base name (recognition intermediates).
    pub companions: Vec<String>,
}

impl ArtifactSet {
    /// Derive the artifact file names for a base name and media kind.
    ///
    /// Image conversions produce a notation export plus the recognition
    /// intermediate; audio conversions produce only the MIDI export.
    pub fn derive(base_name: &str, kind: MediaKind) -> Self {
        match kind {
            MediaKind::Image => Self {
                primary: format!("{base_name}.{NOTATION_EXT}"),
                companions: vec![format!("{base_name}.{RECOGNITION_EXT}")],
            },
            MediaKind::Audio => Self {
                primary: format!("{base_name}.{MIDI_EXT}"),
                companions: Vec::new(),
            },
        }
    }

    /// Iterate over every file name in the set, primary first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.companions.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_kind_round_trip() {
        assert_eq!("image".parse::<MediaKind>().unwrap(), MediaKind::Image);
        assert_eq!("AUDIO".parse::<MediaKind>().unwrap(), MediaKind::Audio);
        assert_eq!(MediaKind::Image.to_string(), "image");
        assert!("video".parse::<MediaKind>().is_err());
    }

    #[test]
    fn media_kind_serde() {
        let json = serde_json::to_string(&MediaKind::Audio).unwrap();
        assert_eq!(json, "\"audio\"");
        let back: MediaKind = serde_json::from_str("\"image\"").unwrap();
        assert_eq!(back, MediaKind::Image);
    }

    #[test]
    fn derive_image_set() {
        let set = ArtifactSet::derive("page", MediaKind::Image);
        assert_eq!(set.primary, "page.xml");
        assert_eq!(set.companions, vec!["page.omr".to_string()]);
    }

    #[test]
    fn derive_audio_set_has_no_companions() {
        let set = ArtifactSet::derive("song_basic_pitch", MediaKind::Audio);
        assert_eq!(set.primary, "song_basic_pitch.mid");
        assert!(set.companions.is_empty());
    }

    #[test]
    fn derive_is_deterministic() {
        let a = ArtifactSet::derive("score_3", MediaKind::Image);
        let b = ArtifactSet::derive("score_3", MediaKind::Image);
        assert_eq!(a, b);
    }

    #[test]
    fn iter_yields_primary_first() {
        let set = ArtifactSet::derive("page", MediaKind::Image);
        let names: Vec<&str> = set.iter().collect();
        assert_eq!(names, vec!["page.xml", "page.omr"]);
    }
}
