//! Product model
//!
//! Prices are integers in the smallest currency unit (rupiah, cents, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{require_text, ValidationError};

pub const MAX_PRODUCT_NAME_LEN: usize = 100;

/// Persisted product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product fields supplied on insert
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: i64,
    pub stock: i32,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price: i64, stock: i32) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            stock,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name, MAX_PRODUCT_NAME_LEN)?;
        if self.price < 0 {
            return Err(ValidationError::OutOfRange {
                field: "price",
                value: self.price,
                reason: "must not be negative",
            });
        }
        if self.stock < 0 {
            return Err(ValidationError::OutOfRange {
                field: "stock",
                value: i64::from(self.stock),
                reason: "must not be negative",
            });
        }
        Ok(())
    }
}
