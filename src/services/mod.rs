//! Service layer for lamad-paths
//!
//! Services hold the request logic between HTTP handlers and repositories:
//! input validation, existence checks, and the transaction boundary. No
//! service calls another; they share only the database handle.
//!
//! ```text
//! HTTP Handlers (thin)
//!     ↓
//! Service Layer (business logic)
//!     ↓
//! Repository Layer (db/*.rs)
//!     ↓
//! SQLite Database
//! ```

pub mod response;
pub mod mock;
pub mod path_service;
pub mod enrollment_service;
pub mod progress_service;
pub mod recommendation_service;

// Re-exports
pub use path_service::PathService;
pub use enrollment_service::EnrollmentService;
pub use progress_service::ProgressService;
pub use recommendation_service::RecommendationService;

use crate::db::PathDb;
use std::sync::Arc;

/// Service container handed to the HTTP server
pub struct Services {
    pub paths: Arc<PathService>,
    pub enrollments: Arc<EnrollmentService>,
    pub progress: Arc<ProgressService>,
    pub recommendations: Arc<RecommendationService>,
    pub db: Arc<PathDb>,
}

impl Services {
    /// Create all services over a shared database
    pub fn new(db: Arc<PathDb>, recommendation_limit: u32) -> Self {
        Self {
            paths: Arc::new(PathService::new(db.clone())),
            enrollments: Arc::new(EnrollmentService::new(db.clone())),
            progress: Arc::new(ProgressService::new(db.clone())),
            recommendations: Arc::new(RecommendationService::new(db.clone(), recommendation_limit)),
            db,
        }
    }
}
