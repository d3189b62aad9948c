//! Address record mapped to the `address` table.

use super::user::UserId;
use super::validation::{validate_email_address, ModelValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Database-assigned `address.id`.
pub type AddressId = i64;

/// Persisted address row, owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub email_address: String,
    /// Owning `user_account.id`; never dangling while foreign keys are on.
    pub user_id: UserId,
}

impl Address {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_email_address(&self.email_address)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Address(id={}, email_address='{}')",
            self.id, self.email_address
        )
    }
}

/// Unsaved address; the owner is supplied when it is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAddress {
    pub email_address: String,
}

impl NewAddress {
    pub fn new(email_address: impl Into<String>) -> Self {
        Self {
            email_address: email_address.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_email_address(&self.email_address)
    }
}
