//! Error types for lamad-paths

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    /// Missing user, path, content or enrollment. The message names the id.
    #[error("{0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorageError {
    pub fn user_not_found(user_id: i64) -> Self {
        Self::NotFound(format!("User {} not found", user_id))
    }

    pub fn path_not_found(path_id: i64) -> Self {
        Self::NotFound(format!("Learning path {} not found", path_id))
    }

    pub fn content_not_found(content_id: i64) -> Self {
        Self::NotFound(format!("Content {} not found", content_id))
    }

    pub fn enrollment_not_found(user_id: i64, path_id: i64) -> Self {
        Self::NotFound(format!(
            "No enrollment found for user {} on path {}",
            user_id, path_id
        ))
    }
}
