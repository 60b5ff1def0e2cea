/// Structured error types for tokoctl-core.
///
/// Library code returns these; the CLI wraps them in `anyhow` and the HTTP
/// layer maps [`OrderErrorKind`] to status codes.
use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::models::ValidationError;

/// Failure reported by a persistence backend.
///
/// Backends wrap their native error (sqlx, I/O, ...) so the core never
/// depends on a particular driver.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct StoreError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl StoreError {
    /// Wrap a backend error.
    pub fn backend<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Error without an underlying cause.
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }
}

/// Outcome kinds of a failed order placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderErrorKind {
    InvalidInput,
    NotFound,
    InsufficientStock,
    StorageFailure,
}

impl OrderErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::NotFound => "not_found",
            Self::InsufficientStock => "insufficient_stock",
            Self::StorageFailure => "storage_failure",
        }
    }
}

impl fmt::Display for OrderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by order placement
#[derive(Error, Debug)]
pub enum OrderError {
    /// Rejected before any storage access
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// Referenced product does not exist
    #[error("product {product_id} not found")]
    NotFound { product_id: i64 },

    /// Stock below the requested quantity at transaction time
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: i64,
        requested: i32,
        available: i32,
    },

    /// Unit of work could not complete; nothing was written
    #[error("storage failure: {0}")]
    StorageFailure(#[from] StoreError),
}

impl OrderError {
    pub fn kind(&self) -> OrderErrorKind {
        match self {
            Self::InvalidInput(_) => OrderErrorKind::InvalidInput,
            Self::NotFound { .. } => OrderErrorKind::NotFound,
            Self::InsufficientStock { .. } => OrderErrorKind::InsufficientStock,
            Self::StorageFailure(_) => OrderErrorKind::StorageFailure,
        }
    }

    /// Only storage failures may be retried with the same input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageFailure(_))
    }
}
