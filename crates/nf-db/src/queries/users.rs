//! User CRUD operations.

use chrono::Utc;
use nf_core::{Error, Result, UserId};
use rusqlite::Connection;

use crate::models::User;

/// Create a new user and return it.
pub fn create_user(conn: &Connection, username: &str, password_hash: &str) -> Result<User> {
    let id = UserId::new();
    let created_at = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO users (id, username, password_hash, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![id.to_string(), username, password_hash, created_at],
    )
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            Error::Conflict(format!("Username '{username}' already exists"))
        } else {
            Error::database(e.to_string())
        }
    })?;

    Ok(User {
        id,
        username: username.to_string(),
        password_hash: password_hash.to_string(),
        created_at,
    })
}

/// Get a user by primary key.
pub fn get_user_by_id(conn: &Connection, id: UserId) -> Result<Option<User>> {
    let result = conn.query_row(
        "SELECT id, username, password_hash, created_at FROM users WHERE id = ?1",
        [id.to_string()],
        User::from_row,
    );
    match result {
        Ok(u) => Ok(Some(u)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Get a user by username.
pub fn get_user_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
    let result = conn.query_row(
        "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
        [username],
        User::from_row,
    );
    match result {
        Ok(u) => Ok(Some(u)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}
