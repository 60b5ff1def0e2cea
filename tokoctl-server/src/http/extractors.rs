//! Custom Axum extractors

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use tokoctl_core::models::ValidationError;

use super::error::ApiError;

/// Extract and validate a positive numeric id from path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidId(pub i64);

impl ValidId {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let id: i64 = raw.parse().map_err(|_| ValidationError::InvalidFormat {
            field: "id",
            reason: "must be an integer",
        })?;
        if id <= 0 {
            return Err(ValidationError::OutOfRange {
                field: "id",
                value: id,
                reason: "must be positive",
            });
        }
        Ok(Self(id))
    }
}

impl<S> FromRequestParts<S> for ValidId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(ValidationError::Empty { field: "id" }))?;

        Ok(Self::parse(&raw)?)
    }
}
