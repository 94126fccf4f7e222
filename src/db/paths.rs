//! Learning path CRUD operations

use rusqlite::{params, Connection, OptionalExtension};

use super::contents;
use super::models::{PathMetadata, PathRow};
use crate::error::StorageError;

/// Validated input for inserting a path
#[derive(Debug, Clone)]
pub struct NewPath {
    pub title: String,
    pub description: String,
    pub subject: String,
    pub difficulty_level: i64,
    pub estimated_hours: Option<f64>,
    pub metadata: PathMetadata,
    pub created_by: Option<i64>,
    /// Content ids attached in this order
    pub content_ids: Vec<i64>,
}

/// Find path by ID
pub fn find_path(conn: &Connection, id: i64) -> Result<Option<PathRow>, StorageError> {
    let path = conn
        .query_row(
            "SELECT * FROM learning_paths WHERE id = ?",
            params![id],
            |row| PathRow::from_row(row),
        )
        .optional()?;
    Ok(path)
}

/// Insert a path and attach its contents
pub fn create_path(conn: &Connection, input: &NewPath) -> Result<PathRow, StorageError> {
    create_path_with_id(conn, None, input)
}

/// Insert a path with a fixed ID (seeding) or an assigned one
pub fn create_path_with_id(
    conn: &Connection,
    id: Option<i64>,
    input: &NewPath,
) -> Result<PathRow, StorageError> {
    let metadata_json = serde_json::to_string(&input.metadata)?;

    conn.execute(
        r#"
        INSERT INTO learning_paths (
            id, title, description, subject, difficulty_level,
            estimated_hours, metadata_json, created_by
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            id,
            input.title,
            input.description,
            input.subject,
            input.difficulty_level,
            input.estimated_hours,
            metadata_json,
            input.created_by,
        ],
    )?;

    let path_id = id.unwrap_or_else(|| conn.last_insert_rowid());

    for (index, content_id) in input.content_ids.iter().enumerate() {
        contents::attach_content(conn, path_id, *content_id, index as i32, true)?;
    }

    find_path(conn, path_id)?
        .ok_or_else(|| StorageError::Internal("Path not found after insert".to_string()))
}

/// Paths the user is not enrolled in, lowest id first, at most `limit`
pub fn list_paths_not_enrolled(
    conn: &Connection,
    user_id: i64,
    limit: u32,
) -> Result<Vec<PathRow>, StorageError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT * FROM learning_paths
        WHERE id NOT IN (SELECT path_id FROM path_enrollments WHERE user_id = ?)
        ORDER BY id
        LIMIT ?
        "#,
    )?;

    let paths = stmt
        .query_map(params![user_id, limit], |row| PathRow::from_row(row))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(paths)
}
