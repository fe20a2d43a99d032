//! Conversion record operations.
//!
//! Records are append-only per owner. `list_conversions_by_owner` returns
//! rows in insertion order (rowid), which the listing endpoint relies on for
//! its stable-filter guarantee.

use chrono::Utc;
use nf_core::{ConversionId, Error, MediaKind, Result, UserId};
use rusqlite::Connection;

use crate::models::Conversion;

/// Append a conversion record for an owner and return it.
pub fn append_conversion(
    conn: &Connection,
    owner: UserId,
    display_name: &str,
    stored_input_name: &str,
    artifact_base_name: &str,
    media_kind: MediaKind,
) -> Result<Conversion> {
    let id = ConversionId::new();
    let created_at = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO conversions
         (id, owner, display_name, stored_input_name, artifact_base_name, media_kind, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            id.to_string(),
            owner.to_string(),
            display_name,
            stored_input_name,
            artifact_base_name,
            media_kind.to_string(),
            created_at,
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Conversion {
        id,
        owner,
        display_name: display_name.to_string(),
        stored_input_name: stored_input_name.to_string(),
        artifact_base_name: artifact_base_name.to_string(),
        media_kind,
        created_at,
    })
}

/// List all conversion records for an owner, oldest first.
pub fn list_conversions_by_owner(conn: &Connection, owner: UserId) -> Result<Vec<Conversion>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, owner, display_name, stored_input_name, artifact_base_name,
                    media_kind, created_at
             FROM conversions WHERE owner = ?1 ORDER BY rowid ASC",
        )
        .map_err(|e| Error::database(e.to_string()))?;

    let rows = stmt
        .query_map([owner.to_string()], Conversion::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Get a conversion record by primary key.
pub fn get_conversion(conn: &Connection, id: ConversionId) -> Result<Option<Conversion>> {
    let result = conn.query_row(
        "SELECT id, owner, display_name, stored_input_name, artifact_base_name,
                media_kind, created_at
         FROM conversions WHERE id = ?1",
        [id.to_string()],
        Conversion::from_row,
    );
    match result {
        Ok(c) => Ok(Some(c)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}
