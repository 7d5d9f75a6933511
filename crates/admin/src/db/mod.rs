//! Database operations for the admin dashboard.
//!
//! # Tables
//!
//! - `admin_users` - Moderator accounts (owned by this binary)
//! - `sessions` - tower-sessions store (owned by this binary)
//! - `product_requests` - Read and mutated by the moderation inbox
//! - `visitors` - Read-only for the analytics dashboard
//!
//! # Migrations
//!
//! Admin migrations (`crates/admin/migrations/`) create the first two tables;
//! the public tables come from the site migrations. Run both via:
//! ```bash
//! cargo run -p nothanks-cli -- migrate all
//! ```

pub mod admin_users;
pub mod requests;
pub mod visitors;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admin_users::AdminUserRepository;
pub use requests::ProductRequestRepository;
pub use visitors::VisitorRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The row targeted by a mutation does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A conditional update matched no rows (state or version mismatch).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
