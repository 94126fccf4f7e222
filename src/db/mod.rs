//! SQLite database module for learning paths
//!
//! ## Tables
//!
//! - `users` - Referenced users (existence checks only)
//! - `learning_paths` - Learning paths with metadata JSON
//! - `learning_contents` - Content items
//! - `path_contents` - Ordered path → content association
//! - `path_enrollments` - One row per (user, path) with progress state
//!
//! Repository functions in the submodules take a `&Connection`. Services run
//! them through [`PathDb::with_tx`] so each request is one transaction that
//! commits on `Ok` and rolls back on `Err`.

pub mod schema;
pub mod models;
pub mod users;
pub mod contents;
pub mod paths;
pub mod enrollments;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, TransactionBehavior};
use tracing::{debug, info};

use crate::error::StorageError;

/// SQLite database for paths, contents and enrollments
pub struct PathDb {
    conn: Mutex<Connection>,
}

impl PathDb {
    /// Open or create the database at `db_path`
    pub fn open(db_path: &Path) -> Result<Self, StorageError> {
        info!("Opening SQLite database at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // Enable WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        Self::init(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, StorageError> {
        debug!("Opening in-memory SQLite database");
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        schema::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Internal(format!("Lock poisoned: {}", e)))
    }

    /// Run a read-only closure against the connection
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Run `f` inside a transaction: commit on `Ok`, roll back on `Err`.
    ///
    /// Writers pass `TransactionBehavior::Immediate` so the write lock is
    /// taken before the first read of a read-modify-write.
    pub fn with_tx<F, T>(&self, behavior: TransactionBehavior, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(behavior)?;

        match f(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                debug!(error = %e, "Rolling back transaction");
                tx.rollback()?;
                Err(e)
            }
        }
    }

    /// Shorthand for a deferred (read) transaction
    pub fn read<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        self.with_tx(TransactionBehavior::Deferred, f)
    }

    /// Shorthand for an immediate write transaction
    pub fn write<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        self.with_tx(TransactionBehavior::Immediate, f)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats, StorageError> {
        self.with_conn(|conn| {
            let count = |table: &str| -> Result<u64, StorageError> {
                let n: i64 = conn.query_row(
                    &format!("SELECT COUNT(*) FROM {}", table),
                    [],
                    |row| row.get(0),
                )?;
                Ok(n as u64)
            };

            Ok(DbStats {
                user_count: count("users")?,
                path_count: count("learning_paths")?,
                content_count: count("learning_contents")?,
                enrollment_count: count("path_enrollments")?,
            })
        })
    }
}

/// Database statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct DbStats {
    pub user_count: u64,
    pub path_count: u64,
    pub content_count: u64,
    pub enrollment_count: u64,
}

// Re-exports
pub use models::{
    ContentProgress, ContentRow, EnrollmentRow, PathMetadata, PathRow, PersonalizationSettings,
    UserRow,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_tx_rolls_back() {
        let db = PathDb::open_in_memory().unwrap();

        let result: Result<(), StorageError> = db.write(|conn| {
            users::create_user(conn, 1, "ada")?;
            Err(StorageError::Internal("boom".into()))
        });
        assert!(result.is_err());

        let found = db.with_conn(|conn| users::find_user(conn, 1)).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_stats_counts_rows() {
        let db = PathDb::open_in_memory().unwrap();
        db.write(|conn| users::create_user(conn, 1, "ada").map(|_| ())).unwrap();

        let stats = db.stats().unwrap();
        assert_eq!(stats.user_count, 1);
        assert_eq!(stats.path_count, 0);
        assert_eq!(stats.enrollment_count, 0);
    }
}
