//! Order model and the validated order quantity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::ValidationError;

/// Persisted order. Never modified after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
}

/// Order row about to be written inside a unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: Quantity,
    pub total_price: i64,
}

/// Requested quantity: strictly positive and fits the `INTEGER` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(i32);

impl Quantity {
    /// Validate a raw requested quantity.
    ///
    /// ```
    /// use tokoctl_core::models::Quantity;
    ///
    /// assert_eq!(Quantity::new(2).unwrap().get(), 2);
    /// assert!(Quantity::new(0).is_err());
    /// assert!(Quantity::new(-3).is_err());
    /// ```
    pub fn new(raw: i64) -> Result<Self, ValidationError> {
        if raw <= 0 {
            return Err(ValidationError::OutOfRange {
                field: "quantity",
                value: raw,
                reason: "must be positive",
            });
        }
        let value = i32::try_from(raw).map_err(|_| ValidationError::OutOfRange {
            field: "quantity",
            value: raw,
            reason: "is too large",
        })?;
        Ok(Self(value))
    }

    pub fn get(self) -> i32 {
        self.0
    }

    /// `quantity * unit_price`, or `None` on overflow.
    pub fn total_for(self, unit_price: i64) -> Option<i64> {
        i64::from(self.0).checked_mul(unit_price)
    }
}
