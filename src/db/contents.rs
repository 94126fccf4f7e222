//! Learning content CRUD operations

use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;

use super::models::ContentRow;
use crate::error::StorageError;

/// Input for creating a content item
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContentInput {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    pub subject: String,
    #[serde(default = "default_difficulty_level")]
    pub difficulty_level: i64,
}

fn default_content_type() -> String { "article".to_string() }
fn default_difficulty_level() -> i64 { 1 }

/// Find content by ID
pub fn find_content(conn: &Connection, id: i64) -> Result<Option<ContentRow>, StorageError> {
    let content = conn
        .query_row(
            "SELECT * FROM learning_contents WHERE id = ?",
            params![id],
            |row| ContentRow::from_row(row),
        )
        .optional()?;
    Ok(content)
}

/// Create a content item, using the given ID when present
pub fn create_content(conn: &Connection, input: &CreateContentInput) -> Result<ContentRow, StorageError> {
    conn.execute(
        r#"
        INSERT INTO learning_contents (id, title, description, content_type, subject, difficulty_level)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
        params![
            input.id,
            input.title,
            input.description,
            input.content_type,
            input.subject,
            input.difficulty_level,
        ],
    )?;

    let id = input.id.unwrap_or_else(|| conn.last_insert_rowid());
    find_content(conn, id)?
        .ok_or_else(|| StorageError::Internal("Content not found after insert".to_string()))
}

/// Contents attached to a path, in path order
pub fn contents_for_path(conn: &Connection, path_id: i64) -> Result<Vec<ContentRow>, StorageError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT c.* FROM learning_contents c
        JOIN path_contents pc ON pc.content_id = c.id
        WHERE pc.path_id = ?
        ORDER BY pc.order_index, c.id
        "#,
    )?;

    let contents = stmt
        .query_map(params![path_id], |row| ContentRow::from_row(row))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(contents)
}

/// Number of contents attached to a path
pub fn content_count(conn: &Connection, path_id: i64) -> Result<u32, StorageError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM path_contents WHERE path_id = ?",
        params![path_id],
        |row| row.get(0),
    )?;
    Ok(count as u32)
}

/// Attach content to a path at the given position
pub fn attach_content(
    conn: &Connection,
    path_id: i64,
    content_id: i64,
    order_index: i32,
    required: bool,
) -> Result<(), StorageError> {
    conn.execute(
        r#"
        INSERT INTO path_contents (path_id, content_id, order_index, required)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(path_id, content_id) DO UPDATE SET order_index = excluded.order_index
        "#,
        params![path_id, content_id, order_index, required],
    )?;
    Ok(())
}
