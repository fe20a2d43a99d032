//! nf-core: shared types, IDs, errors, configuration, and the artifact model.
//!
//! This crate is the foundational dependency for all other nf-* crates,
//! providing type-safe identifiers, a unified error type, the media-kind and
//! artifact-set domain model, and application configuration.

pub mod config;
pub mod error;
pub mod ids;
pub mod media;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use ids::*;
pub use media::*;
