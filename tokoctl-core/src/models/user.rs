//! User model with embedded address and timestamps

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::validation::{check_len, require_text, ValidationError};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 100;
pub const MAX_PASSWORD_LEN: usize = 255;
pub const MAX_PHONE_LEN: usize = 15;

/// Loose shape check: something@something.tld, no whitespace
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex")
});

/// Postal address, stored as `addr_`-prefixed columns on the user row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
}

/// Row lifecycle timestamps. `deleted_at` is set by soft delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Persisted user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub address: Address,
    pub phone_number: Option<String>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// User fields supplied on insert or upsert
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl NewUser {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = address;
        self
    }

    /// Validate every field against the column limits.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name, MAX_NAME_LEN)?;
        validate_email(&self.email)?;
        require_text("password", &self.password, MAX_PASSWORD_LEN)?;
        if let Some(phone) = &self.phone_number {
            check_len("phone_number", phone, MAX_PHONE_LEN)?;
        }
        Ok(())
    }
}

/// Partial update: only `Some` fields are written
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub address: Option<Address>,
    pub phone_number: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.address.is_none()
            && self.phone_number.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            require_text("name", name, MAX_NAME_LEN)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(password) = &self.password {
            require_text("password", password, MAX_PASSWORD_LEN)?;
        }
        if let Some(phone) = &self.phone_number {
            check_len("phone_number", phone, MAX_PHONE_LEN)?;
        }
        Ok(())
    }
}

/// Validate an email address (non-empty, bounded, basic shape).
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    require_text("email", email, MAX_EMAIL_LEN)?;
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidFormat {
            field: "email",
            reason: "must look like name@domain.tld",
        });
    }
    Ok(())
}
