//! Row types for the paths database
//!
//! Free-form JSON columns are mapped onto explicit types:
//!
//! - `learning_paths.metadata_json` → [`PathMetadata`]
//! - `path_enrollments.content_progress_json` → [`ContentProgress`]
//! - `path_enrollments.personalization_json` → [`PersonalizationSettings`]

use std::collections::BTreeMap;

use rusqlite::types::Type;
use rusqlite::Row;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upper bound of the aggregate progress percentage
pub const MAX_PROGRESS: f64 = 100.0;

/// Current UTC timestamp in the format stored in every `*_at` column
pub fn current_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parse a nullable JSON TEXT column, falling back to `T::default()` for NULL.
pub(crate) fn json_column<T>(row: &Row, column: &str) -> rusqlite::Result<T>
where
    T: DeserializeOwned + Default,
{
    let raw: Option<String> = row.get(column)?;
    match raw {
        Some(s) if !s.is_empty() => serde_json::from_str(&s).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
        }),
        _ => Ok(T::default()),
    }
}

// ============================================================================
// Users
// ============================================================================

/// A platform user. Only existence matters to this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub created_at: String,
}

impl UserRow {
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            username: row.get("username")?,
            created_at: row.get("created_at")?,
        })
    }
}

// ============================================================================
// Paths
// ============================================================================

/// Structured path metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathMetadata {
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// beginner, intermediate, advanced, ...
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
}

pub fn default_difficulty() -> String {
    "beginner".to_string()
}

impl Default for PathMetadata {
    fn default() -> Self {
        Self {
            goals: Vec::new(),
            prerequisites: Vec::new(),
            difficulty: default_difficulty(),
        }
    }
}

/// Learning path row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathRow {
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

impl PathRow {
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get::<_, Option<String>>("description")?.unwrap_or_default(),
            subject: row.get("subject")?,
            difficulty_level: row.get("difficulty_level")?,
            estimated_hours: row.get("estimated_hours")?,
            metadata: json_column(row, "metadata_json")?,
            created_by: row.get("created_by")?,
            created_at: row.get("created_at")?,
        })
    }
}

// ============================================================================
// Contents
// ============================================================================

/// Learning content row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub content_type: String,
    pub subject: String,
    pub difficulty_level: i64,
    pub created_at: String,
}

impl ContentRow {
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            content_type: row.get("content_type")?,
            subject: row.get("subject")?,
            difficulty_level: row.get("difficulty_level")?,
            created_at: row.get("created_at")?,
        })
    }
}

// ============================================================================
// Enrollments
// ============================================================================

/// Per-content progress, keyed by the content id rendered as a string.
///
/// Values are taken as given: no lower or upper bound is applied per entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentProgress(BTreeMap<String, f64>);

impl ContentProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, content_id: i64, value: f64) {
        self.0.insert(content_id.to_string(), value);
    }

    pub fn get(&self, content_id: i64) -> Option<f64> {
        self.0.get(&content_id.to_string()).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Mean of all entries capped at [`MAX_PROGRESS`]; `None` when empty.
    ///
    /// Entries are finite (JSON has no infinities), so the mean is finite too
    /// even when the plain sum overflows.
    pub fn aggregate(&self) -> Option<f64> {
        if self.0.is_empty() {
            return None;
        }
        let n = self.0.len() as f64;
        let total: f64 = self.0.values().sum();
        let mean = if total.is_finite() {
            total / n
        } else {
            self.0.values().map(|v| v / n).sum()
        };
        Some(mean.min(MAX_PROGRESS))
    }
}

impl FromIterator<(i64, f64)> for ContentProgress {
    fn from_iter<I: IntoIterator<Item = (i64, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

/// Opaque per-enrollment preferences (pace, preferred content types, ...).
/// Stored and returned verbatim; nothing in this service reads the values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonalizationSettings(BTreeMap<String, Value>);

impl PersonalizationSettings {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Enrollment row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentRow {
    pub id: i64,
    pub user_id: i64,
    pub path_id: i64,
    pub progress: f64,
    pub content_progress: ContentProgress,
    pub personalization_settings: PersonalizationSettings,
    pub enrolled_at: String,
    pub last_activity_at: Option<String>,
    pub completed_at: Option<String>,
}

impl EnrollmentRow {
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            path_id: row.get("path_id")?,
            progress: row.get("progress")?,
            content_progress: json_column(row, "content_progress_json")?,
            personalization_settings: json_column(row, "personalization_json")?,
            enrolled_at: row.get("enrolled_at")?,
            last_activity_at: row.get("last_activity_at")?,
            completed_at: row.get("completed_at")?,
        })
    }
}
