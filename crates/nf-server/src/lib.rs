//! nf-server: the HTTP surface and the storage-facing core subsystems.
//!
//! Besides the axum router and route handlers, this crate owns the two
//! pieces that reconcile the record store with durable file storage: the
//! upload store (collision-free admission) and the registry consistency
//! checker (stale-record filtering).

pub mod context;
pub mod error;
pub mod middleware;
pub mod registry;
pub mod router;
pub mod routes;
pub mod storage;

pub use context::AppContext;
pub use router::build_router;
