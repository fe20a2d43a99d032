//! nf-db: SQLite-backed record store for users, sessions, and conversions.
//!
//! Connection pooling is provided by r2d2; migrations are embedded SQL run
//! at pool initialization. Query modules are free functions taking a
//! `&Connection`, so callers control transaction scope.

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
