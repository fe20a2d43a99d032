//! Row models for the record store.

use nf_core::{ConversionId, MediaKind, UserId};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// A user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub created_at: String,
}

impl User {
    /// Map a `users` row (id, username, password_hash, created_at).
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

/// A session token issued at login.
#[derive(Debug, Clone)]
pub struct AuthToken {
    pub user_id: UserId,
    pub token: String,
    pub expires_at: String,
}

/// A persisted conversion record.
///
/// Appended only after the dispatcher reports success; the artifact files it
/// points at may later disappear out-of-band, which is why listings pass
/// records through the registry consistency checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    pub id: ConversionId,
    pub owner: UserId,
    pub display_name: String,
    pub stored_input_name: String,
    pub artifact_base_name: String,
    pub media_kind: MediaKind,
    pub created_at: String,
}

impl Conversion {
    /// Map a `conversions` row in column order
    /// (id, owner, display_name, stored_input_name, artifact_base_name,
    /// media_kind, created_at).
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let kind: String = row.get(5)?;
        Ok(Self {
            id: parse_id(row, 0)?,
            owner: parse_id(row, 1)?,
            display_name: row.get(2)?,
            stored_input_name: row.get(3)?,
            artifact_base_name: row.get(4)?,
            media_kind: kind.parse().map_err(|e: String| {
                rusqlite::Error::FromSqlConversionFailure(
                    5,
                    rusqlite::types::Type::Text,
                    e.into(),
                )
            })?,
            created_at: row.get(6)?,
        })
    }
}

/// Parse a UUID-typed ID from a TEXT column.
fn parse_id<T: std::str::FromStr<Err = uuid::Error>>(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<T> {
    let s: String = row.get(idx)?;
    s.parse().map_err(|e: uuid::Error| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
