//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Multi-row inserts are one statement (no per-row round trips)
//! - Conflicts are handled via the unique index (no check-then-insert)
//! - Soft-deleted users are invisible to every read

pub mod orders;
pub mod products;
pub mod users;

pub use orders::OrderRepo;
pub use products::ProductRepo;
pub use users::{SortField, UserField, UserQuery, UserRepo, UserSort, UserSummary};

use tokoctl_core::models::ValidationError;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid input: {0}")]
    Invalid(#[from] ValidationError),
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Map unique violations to [`DbError::Conflict`], everything else to
    /// [`DbError::Sqlx`].
    pub(crate) fn from_write(err: sqlx::Error, what: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Conflict(format!("{} already exists", what))
            }
            _ => Self::Sqlx(err),
        }
    }
}
