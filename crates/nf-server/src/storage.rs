//! Collision-safe upload admission.
//!
//! The naming resolver probes `base_{counter}{extension}` suffixes until it
//! finds a free name. The probe alone is only a hint under concurrency, so
//! [`UploadStore::store`] wraps resolution and file creation in a
//! per-directory critical section and creates the file with
//! `create_new(true)`, which makes the final step atomic even against
//! writers that bypass the lock.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use nf_core::{Result, StoredFile};

/// Reduce a client-supplied file name to a safe final path component.
///
/// Any directory prefix is dropped; names that reduce to nothing, `.`, or
/// `..` are rejected. Used both for upload names and for requested artifact
/// names, so a request can never escape its configured directory.
pub fn sanitize_file_name(requested: &str) -> Option<String> {
    let name = requested
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(requested)
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        return None;
    }

    Some(name.to_string())
}

/// Resolve a name that does not collide with existing files in `dir`.
///
/// Returns `desired` unchanged when free; otherwise probes
/// `base_1.ext`, `base_2.ext`, ... and returns the first free name. The
/// probe is deterministic given the directory's contents at call time. This
/// function only reads the directory; pair it with an atomic create (see
/// [`UploadStore::store`]) when collision-freedom must hold under
/// concurrent writers.
pub fn resolve_unique_name(dir: &Path, desired: &str) -> String {
    if !dir.join(desired).exists() {
        return desired.to_string();
    }

    let (base, ext) = match desired.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, format!(".{ext}")),
        _ => (desired, String::new()),
    };

    let mut counter = 1u32;
    loop {
        let candidate = format!("{base}_{counter}{ext}");
        if !dir.join(&candidate).exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Admission point for uploaded files.
///
/// One store serves every upload directory; locks are keyed per directory
/// so concurrent admissions into different directories never contend.
#[derive(Default)]
pub struct UploadStore {
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl UploadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` in `dir` under a collision-free variant of `desired`.
    ///
    /// Creates the directory if needed. The returned [`StoredFile`] is never
    /// overwritten in place by later admissions of the same name.
    pub fn store(&self, dir: &Path, desired: &str, data: &[u8]) -> Result<StoredFile> {
        std::fs::create_dir_all(dir)?;

        let lock = self
            .locks
            .entry(dir.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock();

        let name = resolve_unique_name(dir, desired);
        let path = dir.join(&name);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        file.write_all(data)?;

        Ok(StoredFile { path, name })
    }
}
