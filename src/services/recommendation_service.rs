//! Recommendation service - enrolled listings and the recommendation slice
//!
//! Recommendations are the first `limit` paths by id that the user is not
//! enrolled in. Personalization settings are not consulted.

use std::sync::Arc;

use tracing::debug;

use crate::db::{contents, enrollments, paths, users, PathDb};
use crate::error::StorageError;
use crate::views::PathSummaryView;

pub struct RecommendationService {
    db: Arc<PathDb>,
    limit: u32,
}

impl RecommendationService {
    pub fn new(db: Arc<PathDb>, limit: u32) -> Self {
        Self { db, limit }
    }

    /// Paths the user is enrolled in, with content count and progress.
    ///
    /// Enrollments whose path has been removed are skipped. An unknown user
    /// simply has no enrollments.
    pub fn list_enrolled(&self, user_id: i64) -> Result<Vec<PathSummaryView>, StorageError> {
        self.db.read(|conn| {
            let mut listed = vec![];
            for enrollment in enrollments::list_enrollments_by_user(conn, user_id)? {
                let Some(path) = paths::find_path(conn, enrollment.path_id)? else {
                    debug!(
                        enrollment_id = enrollment.id,
                        path_id = enrollment.path_id,
                        "Skipping enrollment for missing path"
                    );
                    continue;
                };
                let count = contents::content_count(conn, path.id)?;
                listed.push(PathSummaryView::new(path, count, Some(enrollment.progress)));
            }
            Ok(listed)
        })
    }

    /// Up to `limit` paths the user has not enrolled in
    pub fn recommend(&self, user_id: i64) -> Result<Vec<PathSummaryView>, StorageError> {
        self.db.read(|conn| {
            if !users::user_exists(conn, user_id)? {
                return Err(StorageError::user_not_found(user_id));
            }

            let mut recommended = vec![];
            for path in paths::list_paths_not_enrolled(conn, user_id, self.limit)? {
                let count = contents::content_count(conn, path.id)?;
                recommended.push(PathSummaryView::new(path, count, None));
            }
            Ok(recommended)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{PathMetadata, PersonalizationSettings};
    use crate::db::paths::NewPath;

    fn new_path(i: usize) -> NewPath {
        NewPath {
            title: format!("Path {}", i),
            description: String::new(),
            subject: "programming".into(),
            difficulty_level: 2,
            estimated_hours: None,
            metadata: PathMetadata::default(),
            created_by: None,
            content_ids: vec![],
        }
    }

    fn setup(path_count: usize) -> (RecommendationService, Arc<PathDb>, Vec<i64>) {
        let db = Arc::new(PathDb::open_in_memory().unwrap());
        let ids = db
            .write(|conn| {
                users::create_user(conn, 1, "ada")?;
                let mut ids = vec![];
                for i in 0..path_count {
                    ids.push(paths::create_path(conn, &new_path(i))?.id);
                }
                Ok(ids)
            })
            .unwrap();
        (RecommendationService::new(db.clone(), 5), db, ids)
    }

    fn enroll(db: &PathDb, user_id: i64, path_id: i64) {
        db.write(|conn| {
            enrollments::insert_enrollment_if_absent(
                conn,
                user_id,
                path_id,
                &PersonalizationSettings::default(),
            )
        })
        .unwrap();
    }

    #[test]
    fn test_list_enrolled_empty() {
        let (service, _db, _ids) = setup(3);
        assert!(service.list_enrolled(1).unwrap().is_empty());
        // Unknown user is not an error here
        assert!(service.list_enrolled(77).unwrap().is_empty());
    }

    #[test]
    fn test_list_enrolled_skips_missing_paths() {
        let (service, db, ids) = setup(2);
        enroll(&db, 1, ids[0]);
        enroll(&db, 1, 9999);

        let listed = service.list_enrolled(1).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, ids[0]);
        assert_eq!(listed[0].progress, Some(0.0));
        assert_eq!(listed[0].content_count, 0);
    }

    #[test]
    fn test_recommend_excludes_enrolled_and_caps_at_limit() {
        let (service, db, ids) = setup(8);
        enroll(&db, 1, ids[0]);
        enroll(&db, 1, ids[3]);

        let recommended = service.recommend(1).unwrap();
        assert_eq!(recommended.len(), 5);
        assert!(recommended.iter().all(|p| p.id != ids[0] && p.id != ids[3]));
        assert!(recommended.iter().all(|p| p.progress.is_none()));

        let rec_ids: Vec<i64> = recommended.iter().map(|p| p.id).collect();
        assert_eq!(rec_ids, vec![ids[1], ids[2], ids[4], ids[5], ids[6]]);
    }

    #[test]
    fn test_recommend_with_very_many_enrollments() {
        let (service, db, ids) = setup(7);
        enroll(&db, 1, ids[0]);
        db.write(|conn| {
            let mut stmt = conn.prepare(
                "INSERT INTO path_enrollments (user_id, path_id, progress) VALUES (1, ?, 0)",
            )?;
            for path_id in 100_000..133_000_i64 {
                stmt.execute([path_id])?;
            }
            Ok(())
        })
        .unwrap();

        let recommended = service.recommend(1).unwrap();
        let rec_ids: Vec<i64> = recommended.iter().map(|p| p.id).collect();
        assert_eq!(rec_ids, vec![ids[1], ids[2], ids[3], ids[4], ids[5]]);
    }

    #[test]
    fn test_recommend_unknown_user() {
        let (service, _db, _ids) = setup(1);
        let err = service.recommend(2).unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
