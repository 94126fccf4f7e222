//! Database schema definitions

use rusqlite::Connection;
use tracing::info;

use crate::error::StorageError;

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<(), StorageError> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Creating new database schema v{}", SCHEMA_VERSION);
        conn.execute_batch(USERS_SCHEMA)?;
        conn.execute_batch(PATHS_SCHEMA)?;
        conn.execute_batch(ENROLLMENTS_SCHEMA)?;
        conn.execute_batch(INDEXES_SCHEMA)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version < SCHEMA_VERSION {
        info!("Migrating schema from v{} to v{}", current_version, SCHEMA_VERSION);
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else {
        info!("Database schema is up to date (v{})", current_version);
    }

    Ok(())
}

/// Get current schema version (0 if not initialized)
pub fn get_schema_version(conn: &Connection) -> Result<i32, StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
        [],
    )?;

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
        .unwrap_or(0);

    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), StorageError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?)", [version])?;
    Ok(())
}

const USERS_SCHEMA: &str = r#"
-- Users are owned by the account service; only ids are referenced here
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
);
"#;

const PATHS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS learning_paths (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    subject TEXT NOT NULL,
    difficulty_level INTEGER NOT NULL DEFAULT 2,
    estimated_hours REAL,

    -- PathMetadata {goals, prerequisites, difficulty}
    metadata_json TEXT,

    created_by INTEGER,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),

    FOREIGN KEY (created_by) REFERENCES users(id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS learning_contents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    content_type TEXT NOT NULL DEFAULT 'article',
    subject TEXT NOT NULL,
    difficulty_level INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
);

CREATE TABLE IF NOT EXISTS path_contents (
    path_id INTEGER NOT NULL,
    content_id INTEGER NOT NULL,
    order_index INTEGER NOT NULL DEFAULT 0,
    required INTEGER NOT NULL DEFAULT 1,
    PRIMARY KEY (path_id, content_id),
    FOREIGN KEY (path_id) REFERENCES learning_paths(id) ON DELETE CASCADE,
    FOREIGN KEY (content_id) REFERENCES learning_contents(id) ON DELETE CASCADE
);
"#;

const ENROLLMENTS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS path_enrollments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    -- NOTE: No FK on path_id. Enrollments outlive deleted paths and are
    -- skipped when listed.
    path_id INTEGER NOT NULL,

    -- Aggregate 0-100, mean of content_progress capped at 100
    progress REAL NOT NULL DEFAULT 0,
    -- {"<content_id>": <progress>}
    content_progress_json TEXT NOT NULL DEFAULT '{}',
    personalization_json TEXT NOT NULL DEFAULT '{}',

    enrolled_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
    last_activity_at TEXT,
    completed_at TEXT,

    UNIQUE (user_id, path_id),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);
"#;

const INDEXES_SCHEMA: &str = r#"
CREATE INDEX IF NOT EXISTS idx_paths_subject ON learning_paths(subject);
CREATE INDEX IF NOT EXISTS idx_path_contents_order ON path_contents(path_id, order_index);
CREATE INDEX IF NOT EXISTS idx_enrollments_user ON path_enrollments(user_id);
"#;
