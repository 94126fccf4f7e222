//! Seed loading - bulk insert of users, contents and paths from JSON
//!
//! ```json
//! {
//!   "users":    [{"id": 1, "username": "ada"}],
//!   "contents": [{"id": 101, "title": "Intro", "subject": "programming"}],
//!   "paths":    [{"id": 1, "title": "Rust", "subject": "programming", "content_ids": [101]}]
//! }
//! ```
//!
//! Rows whose id already exists are skipped, so a seed file can be applied on
//! every start. Items that fail validation are reported in
//! [`SeedResult::errors`] without stopping the rest of the load.

use std::path::Path;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::contents::{self, CreateContentInput};
use crate::db::{paths, users, PathDb};
use crate::error::StorageError;
use crate::services::path_service::validate_path_input;
use crate::views::CreatePathInputView;

/// Seed file contents
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub contents: Vec<CreateContentInput>,
    #[serde(default)]
    pub paths: Vec<SeedPath>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub id: i64,
    pub username: String,
}

/// A path entry, with an optional fixed id
#[derive(Debug, Clone, Deserialize)]
pub struct SeedPath {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub input: CreatePathInputView,
}

/// Outcome of a seed load
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedResult {
    pub inserted: u64,
    pub skipped: u64,
    pub errors: Vec<String>,
}

impl SeedResult {
    fn record(&mut self, outcome: Result<bool, StorageError>, label: String) {
        match outcome {
            Ok(true) => self.inserted += 1,
            Ok(false) => self.skipped += 1,
            Err(e) => {
                warn!(item = %label, error = %e, "Seed item rejected");
                self.errors.push(format!("{}: {}", label, e));
            }
        }
    }
}

/// Read a seed file from disk and load it
pub fn load_seed_file(db: &PathDb, path: &Path) -> Result<SeedResult, StorageError> {
    let raw = std::fs::read_to_string(path)?;
    let seed: SeedFile = serde_json::from_str(&raw)?;
    let result = load_seed(db, &seed)?;

    info!(
        file = %path.display(),
        inserted = result.inserted,
        skipped = result.skipped,
        errors = result.errors.len(),
        "Seed loaded"
    );

    Ok(result)
}

/// Load users, then contents, then paths in one transaction
pub fn load_seed(db: &PathDb, seed: &SeedFile) -> Result<SeedResult, StorageError> {
    db.write(|conn| {
        let mut result = SeedResult::default();

        for user in &seed.users {
            let outcome = seed_user(conn, user);
            result.record(outcome, format!("user {}", user.id));
        }

        for content in &seed.contents {
            let outcome = seed_content(conn, content);
            result.record(outcome, format!("content '{}'", content.title));
        }

        for path in &seed.paths {
            let label = match path.id {
                Some(id) => format!("path {}", id),
                None => format!("path '{}'", path.input.title.as_deref().unwrap_or_default()),
            };
            let outcome = seed_path(conn, path);
            result.record(outcome, label);
        }

        Ok(result)
    })
}

fn seed_user(conn: &Connection, user: &SeedUser) -> Result<bool, StorageError> {
    if users::user_exists(conn, user.id)? {
        return Ok(false);
    }
    users::create_user(conn, user.id, &user.username)?;
    Ok(true)
}

fn seed_content(conn: &Connection, input: &CreateContentInput) -> Result<bool, StorageError> {
    if let Some(id) = input.id {
        if contents::find_content(conn, id)?.is_some() {
            return Ok(false);
        }
    }
    contents::create_content(conn, input)?;
    Ok(true)
}

fn seed_path(conn: &Connection, path: &SeedPath) -> Result<bool, StorageError> {
    if let Some(id) = path.id {
        if paths::find_path(conn, id)?.is_some() {
            return Ok(false);
        }
    }

    let new_path = validate_path_input(path.input.clone())?;

    if let Some(user_id) = new_path.created_by {
        if !users::user_exists(conn, user_id)? {
            return Err(StorageError::user_not_found(user_id));
        }
    }
    for content_id in &new_path.content_ids {
        if contents::find_content(conn, *content_id)?.is_none() {
            return Err(StorageError::content_not_found(*content_id));
        }
    }

    paths::create_path_with_id(conn, path.id, &new_path)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SEED: &str = r#"{
        "users": [{"id": 1, "username": "ada"}, {"id": 2, "username": "grace"}],
        "contents": [
            {"id": 101, "title": "Intro", "content_type": "video", "subject": "programming"},
            {"id": 102, "title": "Exercises", "subject": "programming", "difficulty_level": 2}
        ],
        "paths": [
            {"id": 1, "title": "Rust", "subject": "programming", "estimated_hours": 25,
             "content_ids": [101, 102], "created_by": 1},
            {"title": "Statistics", "subject": "data_science"}
        ]
    }"#;

    #[test]
    fn test_load_seed_inserts_everything() {
        let db = PathDb::open_in_memory().unwrap();
        let seed: SeedFile = serde_json::from_str(SEED).unwrap();

        let result = load_seed(&db, &seed).unwrap();
        assert_eq!(result.inserted, 6);
        assert_eq!(result.skipped, 0);
        assert!(result.errors.is_empty());

        let stats = db.stats().unwrap();
        assert_eq!(stats.user_count, 2);
        assert_eq!(stats.content_count, 2);
        assert_eq!(stats.path_count, 2);

        let ordered = db
            .read(|conn| contents::contents_for_path(conn, 1))
            .unwrap();
        let ids: Vec<i64> = ordered.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![101, 102]);
    }

    #[test]
    fn test_load_seed_twice_skips_existing() {
        let db = PathDb::open_in_memory().unwrap();
        let seed: SeedFile = serde_json::from_str(SEED).unwrap();
        load_seed(&db, &seed).unwrap();

        let second = load_seed(&db, &seed).unwrap();
        // The id-less path is inserted again; everything with an id is skipped
        assert_eq!(second.skipped, 5);
        assert_eq!(second.inserted, 1);
        assert_eq!(db.stats().unwrap().user_count, 2);
    }

    #[test]
    fn test_invalid_items_are_reported() {
        let db = PathDb::open_in_memory().unwrap();
        let seed: SeedFile = serde_json::from_str(
            r#"{"paths": [
                {"id": 5, "title": "", "subject": "math"},
                {"id": 6, "title": "Missing content", "subject": "math", "content_ids": [42]},
                {"id": 7, "title": "Fine", "subject": "math"}
            ]}"#,
        )
        .unwrap();

        let result = load_seed(&db, &seed).unwrap();
        assert_eq!(result.inserted, 1);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[0].starts_with("path 5"));
        assert!(result.errors[1].contains("Content 42 not found"));
        assert_eq!(db.stats().unwrap().path_count, 1);
    }

    #[test]
    fn test_load_seed_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();

        let db = PathDb::open_in_memory().unwrap();
        let result = load_seed_file(&db, file.path()).unwrap();
        assert_eq!(result.inserted, 6);
    }

    #[test]
    fn test_load_seed_file_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();

        let db = PathDb::open_in_memory().unwrap();
        let err = load_seed_file(&db, file.path()).unwrap_err();
        assert!(matches!(err, StorageError::Json(_)));
    }
}
