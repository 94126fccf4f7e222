//! Lamad Paths - learning path service
//!
//! Stores learning paths, their ordered contents, and per-user enrollments
//! with content-level progress. Served over a small JSON HTTP API.
//!
//! ## Architecture
//!
//! - **http**: hyper server and router, one handler per endpoint
//! - **services**: validation, existence checks, transaction boundaries
//! - **db**: SQLite repositories over a single mutex-guarded connection
//!
//! ## Storage Layout
//!
//! ```text
//! ~/.local/share/lamad-paths/
//! ├── paths.db       # SQLite database (WAL mode)
//! └── config.toml    # Configuration
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod seed;
pub mod services;
pub mod views;

// Re-exports
pub use config::Config;
pub use db::PathDb;
pub use error::StorageError;
pub use http::HttpServer;
pub use services::Services;
