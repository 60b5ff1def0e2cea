//! Domain models with validation
//!
//! Each entity is defined once here and shared by every store and surface.
//! Invalid input returns ValidationError, not panic.

pub mod order;
pub mod product;
pub mod user;
pub mod validation;

pub use order::{NewOrder, Order, Quantity};
pub use product::{NewProduct, Product};
pub use user::{validate_email, Address, NewUser, Timestamps, User, UserPatch};
pub use validation::ValidationError;
