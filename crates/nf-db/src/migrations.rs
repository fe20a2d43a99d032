//! Embedded SQL migrations and runner.
//!
//! Migrations are stored as `&str` constants and executed in order.  A
//! `schema_migrations` table tracks which versions have been applied.

use rusqlite::Connection;
use nf_core::{Error, Result};

/// V1: initial schema -- users, session tokens, and conversion records.
const V1_INITIAL: &str = r#"
-- Users and auth
CREATE TABLE users (
    id            TEXT PRIMARY KEY,
    username      TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE auth_tokens (
    id         TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(id),
    token      TEXT UNIQUE NOT NULL,
    expires_at TEXT NOT NULL
);

-- Conversion records. Append-only per owner; owner has no FK because the
-- anonymous user (auth disabled) never has a users row.
CREATE TABLE conversions (
    id                 TEXT PRIMARY KEY,
    owner              TEXT NOT NULL,
    display_name       TEXT NOT NULL,
    stored_input_name  TEXT NOT NULL,
    artifact_base_name TEXT NOT NULL,
    media_kind         TEXT NOT NULL,
    created_at         TEXT NOT NULL
);

CREATE INDEX idx_conversions_owner ON conversions(owner);
CREATE INDEX idx_auth_tokens_token ON auth_tokens(token);
"#;

/// All migrations in application order.
const MIGRATIONS: &[(i64, &str)] = &[(1, V1_INITIAL)];

/// Run all pending migrations on the given connection.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
             version    INTEGER PRIMARY KEY,
             applied_at TEXT NOT NULL
         );",
    )
    .map_err(|e| Error::database(e.to_string()))?;

    for &(version, sql) in MIGRATIONS {
        let applied: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM schema_migrations WHERE version = ?1",
                [version],
                |row| row.get(0),
            )
            .map_err(|e| Error::database(e.to_string()))?;

        if applied > 0 {
            continue;
        }

        conn.execute_batch(&format!(
            "BEGIN;
             {sql}
             INSERT INTO schema_migrations (version, applied_at)
             VALUES ({version}, datetime('now'));
             COMMIT;"
        ))
        .map_err(|e| Error::database(format!("migration v{version} failed: {e}")))?;
    }

    Ok(())
}
