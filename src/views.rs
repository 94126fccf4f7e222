//! View types for the HTTP API boundary
//!
//! Row types in `db::models` mirror the tables; these are the JSON bodies
//! clients see. All fields are snake_case.
//!
//! Request bodies keep required fields as `Option` so that a missing field
//! becomes a 400 naming the field instead of a generic JSON error.

use serde::{Deserialize, Serialize};

use crate::db::models::{
    ContentProgress, ContentRow, EnrollmentRow, PathMetadata, PathRow, PersonalizationSettings,
};

// ============================================================================
// Path Views
// ============================================================================

/// Path as returned from `POST /paths`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub subject: String,
    pub difficulty_level: i64,
    pub estimated_hours: Option<f64>,
    pub metadata: PathMetadata,
    pub created_by: Option<i64>,
    pub created_at: String,
}

impl From<PathRow> for PathView {
    fn from(p: PathRow) -> Self {
        Self {
            id: p.id,
            title: p.title,
            description: p.description,
            subject: p.subject,
            difficulty_level: p.difficulty_level,
            estimated_hours: p.estimated_hours,
            metadata: p.metadata,
            created_by: p.created_by,
            created_at: p.created_at,
        }
    }
}

/// Content entry inside a path detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSummaryView {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub content_type: String,
    pub subject: String,
    pub difficulty_level: i64,
}

impl From<ContentRow> for ContentSummaryView {
    fn from(c: ContentRow) -> Self {
        Self {
            id: c.id,
            title: c.title,
            description: c.description,
            content_type: c.content_type,
            subject: c.subject,
            difficulty_level: c.difficulty_level,
        }
    }
}

/// Caller's progress snapshot on a path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProgressView {
    pub overall_progress: f64,
    pub content_progress: ContentProgress,
    pub enrolled_at: String,
}

impl From<EnrollmentRow> for UserProgressView {
    fn from(e: EnrollmentRow) -> Self {
        Self {
            overall_progress: e.progress,
            content_progress: e.content_progress,
            enrolled_at: e.enrolled_at,
        }
    }
}

/// `GET /paths/{id}` body, for stored and mock paths alike
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathDetailView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub subject: String,
    pub difficulty_level: i64,
    pub estimated_hours: Option<f64>,
    pub created_at: String,
    pub metadata: PathMetadata,
    pub contents: Vec<ContentSummaryView>,
    pub user_progress: Option<UserProgressView>,
}

/// Path listing entry for `/paths/enrolled` and `/paths/recommended`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSummaryView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub subject: String,
    pub difficulty_level: i64,
    pub estimated_hours: Option<f64>,
    pub created_at: String,
    pub content_count: u32,
    /// Only present on enrolled listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}

impl PathSummaryView {
    pub fn new(p: PathRow, content_count: u32, progress: Option<f64>) -> Self {
        Self {
            id: p.id,
            title: p.title,
            description: p.description,
            subject: p.subject,
            difficulty_level: p.difficulty_level,
            estimated_hours: p.estimated_hours,
            created_at: p.created_at,
            content_count,
            progress,
        }
    }
}

// ============================================================================
// Enrollment Views
// ============================================================================

/// `POST /paths/enroll` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentView {
    pub id: i64,
    pub user_id: i64,
    pub path_id: i64,
    pub progress: f64,
    pub enrolled_at: String,
    pub content_progress: ContentProgress,
}

impl From<EnrollmentRow> for EnrollmentView {
    fn from(e: EnrollmentRow) -> Self {
        Self {
            id: e.id,
            user_id: e.user_id,
            path_id: e.path_id,
            progress: e.progress,
            enrolled_at: e.enrolled_at,
            content_progress: e.content_progress,
        }
    }
}

/// `POST /paths/{id}/progress` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressView {
    pub id: i64,
    pub user_id: i64,
    pub path_id: i64,
    pub progress: f64,
    pub content_progress: ContentProgress,
    pub last_activity_at: Option<String>,
    pub completed_at: Option<String>,
}

impl From<EnrollmentRow> for ProgressView {
    fn from(e: EnrollmentRow) -> Self {
        Self {
            id: e.id,
            user_id: e.user_id,
            path_id: e.path_id,
            progress: e.progress,
            content_progress: e.content_progress,
            last_activity_at: e.last_activity_at,
            completed_at: e.completed_at,
        }
    }
}

// ============================================================================
// Input Views
// ============================================================================

/// `POST /paths` request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePathInputView {
    pub title: Option<String>,
    pub subject: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty_level: Option<i64>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub created_by: Option<i64>,
    #[serde(default)]
    pub content_ids: Vec<i64>,
}

/// `POST /paths/enroll` request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrollInputView {
    pub user_id: Option<i64>,
    pub path_id: Option<i64>,
    #[serde(default)]
    pub personalization_settings: Option<PersonalizationSettings>,
}

/// `POST /paths/{id}/progress` request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgressInputView {
    #[serde(default)]
    pub content_id: Option<i64>,
    #[serde(default)]
    pub progress: Option<f64>,
}

/// `?user_id=` query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserQuery {
    #[serde(default)]
    pub user_id: Option<i64>,
}
