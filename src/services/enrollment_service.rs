//! Enrollment service - linking users to learning paths
//!
//! Enrolling is idempotent on (user, path): a repeat call returns the
//! existing enrollment untouched.

use std::sync::Arc;

use tracing::{debug, info};

use crate::db::{enrollments, paths, users, PathDb};
use crate::error::StorageError;
use crate::views::{EnrollInputView, EnrollmentView};

pub struct EnrollmentService {
    db: Arc<PathDb>,
}

impl EnrollmentService {
    pub fn new(db: Arc<PathDb>) -> Self {
        Self { db }
    }

    /// Enroll a user in a path, or return the enrollment they already have
    pub fn enroll(&self, input: EnrollInputView) -> Result<EnrollmentView, StorageError> {
        let user_id = input
            .user_id
            .ok_or_else(|| StorageError::InvalidInput("user_id is required".into()))?;
        let path_id = input
            .path_id
            .ok_or_else(|| StorageError::InvalidInput("path_id is required".into()))?;
        let settings = input.personalization_settings.unwrap_or_default();

        let (enrollment, created) = self.db.write(|conn| {
            if !users::user_exists(conn, user_id)? {
                return Err(StorageError::user_not_found(user_id));
            }
            if paths::find_path(conn, path_id)?.is_none() {
                return Err(StorageError::path_not_found(path_id));
            }

            enrollments::insert_enrollment_if_absent(conn, user_id, path_id, &settings)
        })?;

        if created {
            info!(enrollment_id = enrollment.id, user_id, path_id, "Enrolled user in path");
        } else {
            debug!(enrollment_id = enrollment.id, user_id, path_id, "User already enrolled");
        }

        Ok(enrollment.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::PathMetadata;
    use crate::db::paths::NewPath;

    fn setup() -> (EnrollmentService, Arc<PathDb>, i64) {
        let db = Arc::new(PathDb::open_in_memory().unwrap());
        let path_id = db
            .write(|conn| {
                users::create_user(conn, 1, "ada")?;
                paths::create_path(
                    conn,
                    &NewPath {
                        title: "Rust".into(),
                        description: String::new(),
                        subject: "programming".into(),
                        difficulty_level: 2,
                        estimated_hours: Some(10.0),
                        metadata: PathMetadata::default(),
                        created_by: None,
                        content_ids: vec![],
                    },
                )
            })
            .unwrap()
            .id;
        (EnrollmentService::new(db.clone()), db, path_id)
    }

    fn request(user_id: i64, path_id: i64) -> EnrollInputView {
        EnrollInputView {
            user_id: Some(user_id),
            path_id: Some(path_id),
            personalization_settings: None,
        }
    }

    #[test]
    fn test_enroll_twice_returns_same_enrollment() {
        let (service, db, path_id) = setup();

        let first = service.enroll(request(1, path_id)).unwrap();
        let second = service.enroll(request(1, path_id)).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.progress, 0.0);
        assert!(first.content_progress.is_empty());
        assert_eq!(db.stats().unwrap().enrollment_count, 1);
    }

    #[test]
    fn test_repeat_enroll_keeps_original_settings() {
        let (service, db, path_id) = setup();

        let settings = serde_json::from_str(r#"{"pace": "fast"}"#).unwrap();
        service
            .enroll(EnrollInputView {
                personalization_settings: Some(settings),
                ..request(1, path_id)
            })
            .unwrap();
        let other = serde_json::from_str(r#"{"pace": "slow"}"#).unwrap();
        service
            .enroll(EnrollInputView {
                personalization_settings: Some(other),
                ..request(1, path_id)
            })
            .unwrap();

        let stored = db
            .read(|conn| enrollments::find_enrollment(conn, 1, path_id))
            .unwrap()
            .unwrap();
        assert_eq!(
            stored.personalization_settings.get("pace"),
            Some(&serde_json::json!("fast"))
        );
    }

    #[test]
    fn test_enroll_unknown_user_or_path() {
        let (service, _db, path_id) = setup();

        let err = service.enroll(request(2, path_id)).unwrap_err();
        assert!(matches!(err, StorageError::NotFound(ref m) if m.contains("User 2")));

        let err = service.enroll(request(1, 9999)).unwrap_err();
        assert!(matches!(err, StorageError::NotFound(ref m) if m.contains("9999")));
    }

    #[test]
    fn test_enroll_requires_ids() {
        let (service, _db, _path_id) = setup();
        let err = service.enroll(EnrollInputView::default()).unwrap_err();
        assert!(matches!(err, StorageError::InvalidInput(_)));
    }
}
