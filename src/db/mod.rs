//! Database layer
//!
//! SQLite storage for the portal: a connection pool, embedded migrations and
//! one repository per entity.
//!
//! # Usage
//!
//! ```ignore
//! use fsp_portal::config::DatabaseConfig;
//! use fsp_portal::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, DatabasePool, DynDatabasePool, SqliteDatabase};
