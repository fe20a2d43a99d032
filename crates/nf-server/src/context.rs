//! Service-oriented application context.
//!
//! [`AppContext`] is the central struct shared across all route handlers via
//! Axum state. It wraps immutable infrastructure (DB pool, tool registry,
//! engines, upload store) in `Arc`s, so it is cheaply cloneable.

use std::sync::Arc;

use nf_core::config::Config;
use nf_db::pool::DbPool;
use nf_engine::{EngineSet, ToolRegistry};

use crate::storage::UploadStore;

/// Application context shared by all request handlers (via Axum state).
#[derive(Clone)]
pub struct AppContext {
    /// Database connection pool.
    pub db: DbPool,
    /// Immutable application configuration snapshot.
    pub config: Arc<Config>,
    /// External tool registry.
    pub tools: Arc<ToolRegistry>,
    /// The conversion engines, selected by media kind.
    pub engines: Arc<EngineSet>,
    /// Collision-safe upload admission.
    pub uploads: Arc<UploadStore>,
}
