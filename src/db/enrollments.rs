//! Path enrollment operations
//!
//! `UNIQUE(user_id, path_id)` is the only guard against duplicate
//! enrollments; inserts use `ON CONFLICT DO NOTHING` and re-read the row.

use rusqlite::{params, Connection, OptionalExtension};

use super::models::{ContentProgress, EnrollmentRow, PersonalizationSettings};
use crate::error::StorageError;

/// Find the enrollment for a (user, path) pair
pub fn find_enrollment(
    conn: &Connection,
    user_id: i64,
    path_id: i64,
) -> Result<Option<EnrollmentRow>, StorageError> {
    let enrollment = conn
        .query_row(
            "SELECT * FROM path_enrollments WHERE user_id = ? AND path_id = ?",
            params![user_id, path_id],
            |row| EnrollmentRow::from_row(row),
        )
        .optional()?;
    Ok(enrollment)
}

/// All enrollments for a user, oldest first
pub fn list_enrollments_by_user(
    conn: &Connection,
    user_id: i64,
) -> Result<Vec<EnrollmentRow>, StorageError> {
    let mut stmt =
        conn.prepare("SELECT * FROM path_enrollments WHERE user_id = ? ORDER BY id")?;

    let rows = stmt
        .query_map(params![user_id], |row| EnrollmentRow::from_row(row))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Insert a fresh enrollment unless one exists; returns the stored row and
/// whether this call created it.
pub fn insert_enrollment_if_absent(
    conn: &Connection,
    user_id: i64,
    path_id: i64,
    settings: &PersonalizationSettings,
) -> Result<(EnrollmentRow, bool), StorageError> {
    let settings_json = serde_json::to_string(settings)?;

    let inserted = conn.execute(
        r#"
        INSERT INTO path_enrollments (
            user_id, path_id, progress, content_progress_json, personalization_json
        ) VALUES (?, ?, 0, '{}', ?)
        ON CONFLICT(user_id, path_id) DO NOTHING
        "#,
        params![user_id, path_id, settings_json],
    )?;

    let row = find_enrollment(conn, user_id, path_id)?
        .ok_or_else(|| StorageError::Internal("Enrollment not found after insert".to_string()))?;

    Ok((row, inserted > 0))
}

/// Persist progress state for an enrollment
pub fn save_progress(
    conn: &Connection,
    enrollment_id: i64,
    progress: f64,
    content_progress: &ContentProgress,
    last_activity_at: &str,
    completed_at: Option<&str>,
) -> Result<(), StorageError> {
    let content_json = serde_json::to_string(content_progress)?;

    let changes = conn.execute(
        r#"
        UPDATE path_enrollments
        SET progress = ?, content_progress_json = ?, last_activity_at = ?, completed_at = ?
        WHERE id = ?
        "#,
        params![progress, content_json, last_activity_at, completed_at, enrollment_id],
    )?;

    if changes == 0 {
        return Err(StorageError::Internal(format!(
            "Enrollment {} vanished during update",
            enrollment_id
        )));
    }
    Ok(())
}
