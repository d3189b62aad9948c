//! Account domain model: users and the addresses they own.
//!
//! # Responsibility
//! - Define the records mapped to `user_account` and `address`.
//! - Validate field constraints before they reach SQLite.
//!
//! # Invariants
//! - Every `Address` belongs to exactly one `User` through `user_id`.
//! - Persisted records carry database-assigned integer ids; unsaved records
//!   (`NewUser`, `NewAddress`) carry none.

pub mod address;
pub mod user;
mod validation;

pub use validation::{ModelValidationError, USER_NAME_MAX_CHARS};
