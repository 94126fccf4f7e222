//! Path service - creating and fetching learning paths
//!
//! A fetch for an id that is not in storage answers with a sample path from
//! [`super::mock`] instead of a 404.

use std::sync::Arc;

use tracing::{info, warn};

use crate::db::models::{default_difficulty, PathMetadata};
use crate::db::paths::NewPath;
use crate::db::{contents, enrollments, paths, users, PathDb};
use crate::error::StorageError;
use crate::views::{
    ContentSummaryView, CreatePathInputView, PathDetailView, PathView, UserProgressView,
};

use super::mock;

const DEFAULT_DIFFICULTY_LEVEL: i64 = 2;

/// Path service for business logic
pub struct PathService {
    db: Arc<PathDb>,
}

impl PathService {
    pub fn new(db: Arc<PathDb>) -> Self {
        Self { db }
    }

    // =========================================================================
    // Read Operations
    // =========================================================================

    /// Path detail with contents and, when `user_id` is given, the caller's
    /// progress. Unknown ids fall back to a mock path.
    pub fn get(&self, path_id: i64, user_id: Option<i64>) -> Result<PathDetailView, StorageError> {
        let detail = self.db.read(|conn| {
            let Some(path) = paths::find_path(conn, path_id)? else {
                return Ok(None);
            };

            let contents = contents::contents_for_path(conn, path_id)?
                .into_iter()
                .map(ContentSummaryView::from)
                .collect();

            let user_progress = match user_id {
                Some(uid) => {
                    enrollments::find_enrollment(conn, uid, path_id)?.map(UserProgressView::from)
                }
                None => None,
            };

            Ok(Some(PathDetailView {
                id: path.id,
                title: path.title,
                description: path.description,
                subject: path.subject,
                difficulty_level: path.difficulty_level,
                estimated_hours: path.estimated_hours,
                created_at: path.created_at,
                metadata: path.metadata,
                contents,
                user_progress,
            }))
        })?;

        match detail {
            Some(detail) => Ok(detail),
            None => {
                warn!(path_id, "Learning path not in storage, serving mock data");
                Ok(mock::mock_path(path_id, user_id))
            }
        }
    }

    // =========================================================================
    // Write Operations
    // =========================================================================

    /// Create a path, checking the creator and any attached contents exist
    pub fn create(&self, input: CreatePathInputView) -> Result<PathView, StorageError> {
        let new_path = validate_path_input(input)?;

        let row = self.db.write(|conn| {
            if let Some(user_id) = new_path.created_by {
                if !users::user_exists(conn, user_id)? {
                    return Err(StorageError::NotFound(format!(
                        "Creator user {} not found",
                        user_id
                    )));
                }
            }

            for content_id in &new_path.content_ids {
                if contents::find_content(conn, *content_id)?.is_none() {
                    return Err(StorageError::content_not_found(*content_id));
                }
            }

            paths::create_path(conn, &new_path)
        })?;

        info!(path_id = row.id, title = %row.title, subject = %row.subject, "Created learning path");

        Ok(row.into())
    }
}

/// Check required fields and the level range, applying defaults.
///
/// `difficulty` and `estimated_hours` are stored as given.
pub(crate) fn validate_path_input(input: CreatePathInputView) -> Result<NewPath, StorageError> {
    let title = required_text(input.title, "title")?;
    let subject = required_text(input.subject, "subject")?;

    let difficulty_level = input.difficulty_level.unwrap_or(DEFAULT_DIFFICULTY_LEVEL);
    if !(1..=5).contains(&difficulty_level) {
        return Err(StorageError::InvalidInput(format!(
            "difficulty_level must be between 1 and 5, got {}",
            difficulty_level
        )));
    }

    Ok(NewPath {
        title,
        description: input.description.unwrap_or_default(),
        subject,
        difficulty_level,
        estimated_hours: input.estimated_hours,
        metadata: PathMetadata {
            goals: input.goals,
            prerequisites: input.prerequisites,
            difficulty: input.difficulty.unwrap_or_else(default_difficulty),
        },
        created_by: input.created_by,
        content_ids: input.content_ids,
    })
}

fn required_text(value: Option<String>, field: &str) -> Result<String, StorageError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(StorageError::InvalidInput(format!("{} is required", field))),
    }
}
