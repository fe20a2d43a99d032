//! Unified error type for the noteforge application.
//!
//! All crates funnel their failures into [`Error`], which carries enough
//! context for API handlers to derive an HTTP status code via
//! [`Error::http_status`].

use std::fmt;

/// Unified error type covering all failure modes in noteforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "artifact", "user").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A conflicting resource already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A database operation failed.
    #[error("Database error: {source}")]
    Database {
        /// The underlying database error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// An external engine (audiveris, basic-pitch) returned an error.
    #[error("Engine error [{tool}]: {message}")]
    Engine {
        /// Name of the engine executable that failed.
        tool: String,
        /// Human-readable error description (captured stderr).
        message: String,
    },

    /// An external engine exceeded its allotted execution time.
    #[error("Engine timeout [{tool}]: exceeded {secs}s")]
    Timeout {
        /// Name of the engine executable that timed out.
        tool: String,
        /// The deadline that was exceeded, in seconds.
        secs: u64,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::Unauthorized(_) => 401,
            Error::Validation(_) => 400,
            Error::Conflict(_) => 409,
            Error::Database { .. } => 500,
            Error::Io { .. } => 500,
            Error::Engine { .. } => 502,
            Error::Timeout { .. } => 504,
            Error::Internal(_) => 500,
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Database {
            source: source.into(),
        }
    }

    /// Convenience constructor for [`Error::Engine`].
    pub fn engine(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Engine {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Timeout`].
    pub fn timeout(tool: impl Into<String>, secs: u64) -> Self {
        Error::Timeout {
            tool: tool.into(),
            secs,
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = Error::not_found("artifact", "page.xml");
        assert_eq!(err.to_string(), "artifact not found: page.xml");
        assert_eq!(err.http_status(), 404);
    }

    #[test]
    fn unauthorized_display() {
        let err = Error::Unauthorized("bad token".into());
        assert_eq!(err.to_string(), "Unauthorized: bad token");
        assert_eq!(err.http_status(), 401);
    }

    #[test]
    fn validation_display() {
        let err = Error::Validation("file part is required".into());
        assert_eq!(err.to_string(), "Validation error: file part is required");
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn conflict_display() {
        let err = Error::Conflict("username already exists".into());
        assert_eq!(err.http_status(), 409);
    }

    #[test]
    fn database_display() {
        let err = Error::database("connection refused");
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn engine_display() {
        let err = Error::engine("audiveris", "unsupported format");
        assert_eq!(
            err.to_string(),
            "Engine error [audiveris]: unsupported format"
        );
        assert_eq!(err.http_status(), 502);
    }

    #[test]
    fn timeout_display() {
        let err = Error::timeout("basic-pitch", 300);
        assert_eq!(err.to_string(), "Engine timeout [basic-pitch]: exceeded 300s");
        assert_eq!(err.http_status(), 504);
    }

    #[test]
    fn internal_display() {
        let err = Error::Internal("unexpected state".into());
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn result_alias() {
        fn ok_fn() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(ok_fn().unwrap(), 42);
    }
}
