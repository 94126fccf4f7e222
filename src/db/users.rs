//! User lookups
//!
//! Users are administered by the account service. This table only mirrors
//! the ids that paths and enrollments reference.

use rusqlite::{params, Connection, OptionalExtension};

use super::models::UserRow;
use crate::error::StorageError;

/// Find user by ID
pub fn find_user(conn: &Connection, id: i64) -> Result<Option<UserRow>, StorageError> {
    let user = conn
        .query_row("SELECT * FROM users WHERE id = ?", params![id], |row| {
            UserRow::from_row(row)
        })
        .optional()?;
    Ok(user)
}

pub fn user_exists(conn: &Connection, id: i64) -> Result<bool, StorageError> {
    Ok(find_user(conn, id)?.is_some())
}

/// Insert a user with a known ID
pub fn create_user(conn: &Connection, id: i64, username: &str) -> Result<UserRow, StorageError> {
    conn.execute(
        "INSERT INTO users (id, username) VALUES (?, ?)",
        params![id, username],
    )?;

    find_user(conn, id)?
        .ok_or_else(|| StorageError::Internal("User not found after insert".to_string()))
}
