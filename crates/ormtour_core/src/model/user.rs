//! User record mapped to the `user_account` table.

use super::address::NewAddress;
use super::validation::{validate_email_address, validate_user_name, ModelValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Database-assigned `user_account.id`.
pub type UserId = i64;

/// Persisted user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Short login-style name, at most 30 characters.
    pub name: String,
    pub fullname: Option<String>,
}

impl User {
    /// Checks column constraints before an update is written.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_user_name(&self.name)
    }
}

impl Display for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "User(id={}, name='{}', fullname=", self.id, self.name)?;
        match &self.fullname {
            Some(fullname) => write!(f, "'{fullname}')"),
            None => write!(f, "None)"),
        }
    }
}

/// Unsaved user together with the addresses inserted alongside it.
///
/// Adding a `NewUser` also adds every entry of `addresses`, owned by the new
/// user, in list order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub fullname: Option<String>,
    pub addresses: Vec<NewAddress>,
}

impl NewUser {
    /// Creates a user with a full name and no addresses.
    pub fn new(name: impl Into<String>, fullname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fullname: Some(fullname.into()),
            addresses: Vec::new(),
        }
    }

    /// Appends one address to be inserted with this user.
    pub fn with_address(mut self, email_address: impl Into<String>) -> Self {
        self.addresses.push(NewAddress::new(email_address));
        self
    }

    /// Validates the user and every pending address.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_user_name(&self.name)?;
        for address in &self.addresses {
            validate_email_address(&address.email_address)?;
        }
        Ok(())
    }
}
