//! Account use-case service.
//!
//! # Responsibility
//! - Provide user/address entry points in the vocabulary of the tour:
//!   add, select, append, change, remove, delete.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::address::{Address, AddressId, NewAddress};
use crate::model::user::{NewUser, User, UserId};
use crate::repo::address_repo::AddressRepository;
use crate::repo::user_repo::{UserListQuery, UserRepository};
use crate::repo::{RepoError, RepoResult};
use serde::{Deserialize, Serialize};

/// One user together with its loaded address collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub user: User,
    pub addresses: Vec<Address>,
}

/// Use-case service wrapper over user and address repositories.
pub struct AccountService<U: UserRepository, A: AddressRepository> {
    users: U,
    addresses: A,
}

impl<U: UserRepository, A: AddressRepository> AccountService<U, A> {
    /// Creates a service using the provided repository implementations.
    pub fn new(users: U, addresses: A) -> Self {
        Self { users, addresses }
    }

    /// Adds one user with its pending addresses.
    pub fn add_user(&self, user: &NewUser) -> RepoResult<UserAccount> {
        let stored = self.users.create_user(user)?;
        let addresses = self.addresses.list_addresses_for_user(stored.id)?;
        Ok(UserAccount {
            user: stored,
            addresses,
        })
    }

    /// Adds several users in order.
    ///
    /// # Contract
    /// - Stops at the first failure; rows already added stay pending in the
    ///   caller's session, which decides whether to commit.
    pub fn add_users(&self, users: &[NewUser]) -> RepoResult<Vec<UserAccount>> {
        users.iter().map(|user| self.add_user(user)).collect()
    }

    /// Returns users whose name is in `names`, in insertion order.
    pub fn users_named<S: AsRef<str>>(&self, names: &[S]) -> RepoResult<Vec<User>> {
        let query = UserListQuery::with_names(names.iter().map(|name| name.as_ref()));
        self.users.list_users(&query)
    }

    /// Returns exactly one user by name.
    pub fn user_named(&self, name: &str) -> RepoResult<User> {
        self.users.find_user_by_name(name)
    }

    /// Loads a user and its address collection by primary key.
    pub fn get_account(&self, id: UserId) -> RepoResult<Option<UserAccount>> {
        let Some(user) = self.users.get_user(id)? else {
            return Ok(None);
        };
        let addresses = self.addresses.list_addresses_for_user(user.id)?;
        Ok(Some(UserAccount { user, addresses }))
    }

    /// Lists every user with its addresses.
    pub fn list_accounts(&self) -> RepoResult<Vec<UserAccount>> {
        self.users
            .list_users(&UserListQuery::default())?
            .into_iter()
            .map(|user| {
                let addresses = self.addresses.list_addresses_for_user(user.id)?;
                Ok(UserAccount { user, addresses })
            })
            .collect()
    }

    /// Returns exactly one address owned by `user_name` with `email_address`.
    pub fn address_of(&self, user_name: &str, email_address: &str) -> RepoResult<Address> {
        self.addresses.find_address_by_owner(user_name, email_address)
    }

    /// Appends a new address to the user's collection.
    pub fn append_address(
        &self,
        user: &User,
        email_address: impl Into<String>,
    ) -> RepoResult<Address> {
        self.addresses
            .add_address(user.id, &NewAddress::new(email_address))
    }

    /// Assigns a new email to `address` and writes it back.
    pub fn change_email_address(
        &self,
        address: &mut Address,
        email_address: impl Into<String>,
    ) -> RepoResult<()> {
        address.email_address = email_address.into();
        self.addresses.update_address(address)
    }

    /// Removes `address` from `user`'s collection; the orphaned row is deleted.
    pub fn remove_address(&self, user: &User, address: &Address) -> RepoResult<()> {
        self.addresses.remove_address(user.id, address.id)
    }

    /// Deletes the user; its remaining addresses cascade.
    pub fn delete_user(&self, user: &User) -> RepoResult<()> {
        self.users.delete_user(user.id)
    }

    /// Returns `(users, addresses)` row counts.
    pub fn row_counts(&self) -> RepoResult<(u64, u64)> {
        Ok((self.users.count_users()?, self.addresses.count_addresses()?))
    }

    /// Reloads a user that must still exist.
    pub fn reload_user(&self, id: UserId) -> RepoResult<User> {
        self.users.get_user(id)?.ok_or(RepoError::UserNotFound(id))
    }

    /// Reloads an address that must still exist.
    pub fn reload_address(&self, id: AddressId) -> RepoResult<Address> {
        self.addresses
            .get_address(id)?
            .ok_or(RepoError::AddressNotFound(id))
    }
}
