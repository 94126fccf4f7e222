//! Progress service - per-content progress and the path aggregate
//!
//! Each update is a read-modify-write of the enrollment's content progress
//! map, run inside one immediate transaction. The aggregate is the mean of
//! every value in the map, capped at 100 with no lower bound.

use std::sync::Arc;

use tracing::{debug, info};

use crate::db::models::{current_timestamp, EnrollmentRow, MAX_PROGRESS};
use crate::db::{contents, enrollments, PathDb};
use crate::error::StorageError;
use crate::views::{ProgressInputView, ProgressView};

pub struct ProgressService {
    db: Arc<PathDb>,
}

impl ProgressService {
    pub fn new(db: Arc<PathDb>) -> Self {
        Self { db }
    }

    /// Record progress on one content item and recompute the aggregate.
    ///
    /// Without a `content_id` nothing is written and the current state is
    /// returned.
    pub fn update(
        &self,
        path_id: i64,
        user_id: i64,
        input: ProgressInputView,
    ) -> Result<ProgressView, StorageError> {
        let enrollment = self.db.write(|conn| {
            let mut enrollment = enrollments::find_enrollment(conn, user_id, path_id)?
                .ok_or_else(|| StorageError::enrollment_not_found(user_id, path_id))?;

            let Some(content_id) = input.content_id else {
                debug!(user_id, path_id, "Progress read without content_id");
                return Ok(enrollment);
            };

            if contents::find_content(conn, content_id)?.is_none() {
                return Err(StorageError::content_not_found(content_id));
            }

            let value = input.progress.unwrap_or(0.0);
            let now = current_timestamp();
            enrollment.content_progress.set(content_id, value);
            apply_progress(&mut enrollment, &now);

            enrollments::save_progress(
                conn,
                enrollment.id,
                enrollment.progress,
                &enrollment.content_progress,
                &now,
                enrollment.completed_at.as_deref(),
            )?;

            info!(
                enrollment_id = enrollment.id,
                content_id,
                value,
                aggregate = enrollment.progress,
                "Updated path progress"
            );

            Ok(enrollment)
        })?;

        Ok(enrollment.into())
    }
}

/// Recompute the aggregate from the content map and stamp activity.
///
/// `completed_at` is set the first time the aggregate reaches the maximum
/// and is kept afterwards even if the aggregate drops.
pub fn apply_progress(enrollment: &mut EnrollmentRow, now: &str) {
    if let Some(aggregate) = enrollment.content_progress.aggregate() {
        enrollment.progress = aggregate;
    }
    enrollment.last_activity_at = Some(now.to_string());

    if enrollment.progress >= MAX_PROGRESS && enrollment.completed_at.is_none() {
        enrollment.completed_at = Some(now.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::contents::CreateContentInput;
    use crate::db::models::PersonalizationSettings;
    use crate::db::users;

    struct Fixture {
        service: ProgressService,
        db: Arc<PathDb>,
        content_ids: Vec<i64>,
    }

    const PATH_ID: i64 = 10;

    fn setup() -> Fixture {
        let db = Arc::new(PathDb::open_in_memory().unwrap());
        let content_ids = db
            .write(|conn| {
                users::create_user(conn, 1, "ada")?;
                enrollments::insert_enrollment_if_absent(
                    conn,
                    1,
                    PATH_ID,
                    &PersonalizationSettings::default(),
                )?;
                let mut ids = vec![];
                for title in ["A", "B", "C"] {
                    let row = contents::create_content(
                        conn,
                        &CreateContentInput {
                            id: None,
                            title: title.into(),
                            description: None,
                            content_type: "article".into(),
                            subject: "math".into(),
                            difficulty_level: 1,
                        },
                    )?;
                    ids.push(row.id);
                }
                Ok(ids)
            })
            .unwrap();

        Fixture {
            service: ProgressService::new(db.clone()),
            db,
            content_ids,
        }
    }

    fn set(fx: &Fixture, content_idx: usize, value: f64) -> ProgressView {
        fx.service
            .update(
                PATH_ID,
                1,
                ProgressInputView {
                    content_id: Some(fx.content_ids[content_idx]),
                    progress: Some(value),
                },
            )
            .unwrap()
    }

    #[test]
    fn test_aggregate_is_mean_of_contents() {
        let fx = setup();
        set(&fx, 0, 40.0);
        let view = set(&fx, 1, 60.0);

        assert_eq!(view.progress, 50.0);
        assert_eq!(view.content_progress.len(), 2);
        assert!(view.last_activity_at.is_some());
        assert!(view.completed_at.is_none());
    }

    #[test]
    fn test_aggregate_clamped_at_100() {
        let fx = setup();
        set(&fx, 0, 100.0);
        set(&fx, 1, 100.0);
        let view = set(&fx, 2, 130.0);

        assert_eq!(view.progress, 100.0);
        assert!(view.completed_at.is_some());
    }

    #[test]
    fn test_negative_values_pull_mean_down() {
        let fx = setup();
        set(&fx, 0, 20.0);
        let view = set(&fx, 1, -60.0);
        assert_eq!(view.progress, -20.0);
    }

    #[test]
    fn test_missing_progress_defaults_to_zero() {
        let fx = setup();
        let view = fx
            .service
            .update(
                PATH_ID,
                1,
                ProgressInputView {
                    content_id: Some(fx.content_ids[0]),
                    progress: None,
                },
            )
            .unwrap();
        assert_eq!(view.content_progress.get(fx.content_ids[0]), Some(0.0));
        assert_eq!(view.progress, 0.0);
    }

    #[test]
    fn test_no_content_id_is_a_read() {
        let fx = setup();
        set(&fx, 0, 80.0);

        let view = fx
            .service
            .update(PATH_ID, 1, ProgressInputView::default())
            .unwrap();
        assert_eq!(view.progress, 80.0);
        assert_eq!(view.content_progress.len(), 1);
    }

    #[test]
    fn test_missing_enrollment_is_not_found() {
        let fx = setup();
        let err = fx
            .service
            .update(PATH_ID + 1, 1, ProgressInputView::default())
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[test]
    fn test_missing_content_leaves_enrollment_untouched() {
        let fx = setup();
        set(&fx, 0, 30.0);

        let err = fx
            .service
            .update(
                PATH_ID,
                1,
                ProgressInputView {
                    content_id: Some(4242),
                    progress: Some(90.0),
                },
            )
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(ref m) if m.contains("4242")));

        let stored = fx
            .db
            .read(|conn| enrollments::find_enrollment(conn, 1, PATH_ID))
            .unwrap()
            .unwrap();
        assert_eq!(stored.progress, 30.0);
        assert_eq!(stored.content_progress.len(), 1);
        assert!(stored.content_progress.get(4242).is_none());
    }

    #[test]
    fn test_completed_at_is_sticky() {
        let fx = setup();
        let done = set(&fx, 0, 100.0);
        let completed_at = done.completed_at.clone();
        assert!(completed_at.is_some());

        let view = set(&fx, 0, 50.0);
        assert_eq!(view.progress, 50.0);
        assert_eq!(view.completed_at, completed_at);
    }
}
