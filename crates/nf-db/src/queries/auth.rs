//! Session token operations.

use chrono::Utc;
use nf_core::{Error, Result, UserId};
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::AuthToken;

/// Store a new session token for a user.
pub fn create_token(
    conn: &Connection,
    user_id: UserId,
    token: &str,
    expires_at: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO auth_tokens (id, user_id, token, expires_at)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            Uuid::new_v4().to_string(),
            user_id.to_string(),
            token,
            expires_at
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;
    Ok(())
}

/// Look up a token, returning `None` if it is unknown or expired.
///
/// Expired tokens are deleted as a side effect of being looked up.
pub fn get_token(conn: &Connection, token: &str) -> Result<Option<AuthToken>> {
    let result = conn.query_row(
        "SELECT user_id, token, expires_at FROM auth_tokens WHERE token = ?1",
        [token],
        |row| {
            let user_id: String = row.get(0)?;
            Ok((user_id, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
        },
    );

    let (user_id, token_str, expires_at) = match result {
        Ok(t) => t,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
        Err(e) => return Err(Error::database(e.to_string())),
    };

    let expired = chrono::DateTime::parse_from_rfc3339(&expires_at)
        .map(|dt| dt < Utc::now())
        .unwrap_or(true);
    if expired {
        let _ = delete_token(conn, &token_str);
        return Ok(None);
    }

    let user_id: UserId = user_id
        .parse()
        .map_err(|e: uuid::Error| Error::database(e.to_string()))?;

    Ok(Some(AuthToken {
        user_id,
        token: token_str,
        expires_at,
    }))
}

/// Delete a token (logout). Returns true if a row was deleted.
pub fn delete_token(conn: &Connection, token: &str) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM auth_tokens WHERE token = ?1", [token])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}
