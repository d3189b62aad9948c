//! Address repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Manage a user's address collection: append, update, remove.
//! - Resolve addresses through a join on their owning user.
//!
//! # Invariants
//! - An address is only ever written with an existing `user_id`.
//! - Removing an address from a user's collection deletes the row; an
//!   address never survives without an owner.

use super::user_repo::user_exists;
use super::{ensure_connection_ready, exactly_one, RepoError, RepoResult};
use crate::model::address::{Address, AddressId, NewAddress};
use crate::model::user::UserId;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ADDRESS_SELECT_SQL: &str = "SELECT
    address.id AS id,
    address.email_address AS email_address,
    address.user_id AS user_id
FROM address";

/// Repository interface for address operations.
pub trait AddressRepository {
    /// Appends an address to `user_id`'s collection.
    fn add_address(&self, user_id: UserId, address: &NewAddress) -> RepoResult<Address>;
    /// Writes back `email_address` and owner of an existing address.
    fn update_address(&self, address: &Address) -> RepoResult<()>;
    fn get_address(&self, id: AddressId) -> RepoResult<Option<Address>>;
    /// Loads one user's collection ordered by `id ASC`.
    fn list_addresses_for_user(&self, user_id: UserId) -> RepoResult<Vec<Address>>;
    /// Joins to `user_account` and returns the single address matching both
    /// the owner's name and the exact email.
    fn find_address_by_owner(&self, user_name: &str, email_address: &str)
        -> RepoResult<Address>;
    /// Removes the address from `user_id`'s collection, deleting the row.
    fn remove_address(&self, user_id: UserId, address_id: AddressId) -> RepoResult<()>;
    fn count_addresses(&self) -> RepoResult<u64>;
}

/// SQLite-backed address repository.
pub struct SqliteAddressRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAddressRepository<'conn> {
    /// Constructs a repository from a migrated connection or session view.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl AddressRepository for SqliteAddressRepository<'_> {
    fn add_address(&self, user_id: UserId, address: &NewAddress) -> RepoResult<Address> {
        address.validate()?;
        if !user_exists(self.conn, user_id)? {
            return Err(RepoError::UserNotFound(user_id));
        }
        insert_address(self.conn, user_id, address)
    }

    fn update_address(&self, address: &Address) -> RepoResult<()> {
        address.validate()?;
        if !user_exists(self.conn, address.user_id)? {
            return Err(RepoError::UserNotFound(address.user_id));
        }

        let changed = self.conn.execute(
            "UPDATE address
             SET
                email_address = ?1,
                user_id = ?2
             WHERE id = ?3;",
            params![
                address.email_address.as_str(),
                address.user_id,
                address.id
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::AddressNotFound(address.id));
        }

        Ok(())
    }

    fn get_address(&self, id: AddressId) -> RepoResult<Option<Address>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ADDRESS_SELECT_SQL} WHERE address.id = ?1;"))?;
        let address = stmt
            .query_row([id], |row| Ok(read_address_row(row)))
            .optional()?;
        address.transpose()
    }

    fn list_addresses_for_user(&self, user_id: UserId) -> RepoResult<Vec<Address>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ADDRESS_SELECT_SQL}
             WHERE address.user_id = ?1
             ORDER BY address.id ASC;"
        ))?;
        let addresses = collect_addresses(stmt.query([user_id])?)?;
        Ok(addresses)
    }

    fn find_address_by_owner(
        &self,
        user_name: &str,
        email_address: &str,
    ) -> RepoResult<Address> {
        let mut stmt = self.conn.prepare(&format!(
            "{ADDRESS_SELECT_SQL}
             INNER JOIN user_account ON user_account.id = address.user_id
             WHERE user_account.name = ?1
               AND address.email_address = ?2
             ORDER BY address.id ASC;"
        ))?;
        let addresses = collect_addresses(stmt.query(params![user_name, email_address])?)?;

        exactly_one(
            addresses,
            format!(
                "address join user_account where name = '{user_name}' and email_address = '{email_address}'"
            ),
        )
    }

    fn remove_address(&self, user_id: UserId, address_id: AddressId) -> RepoResult<()> {
        let owner: Option<UserId> = self
            .conn
            .query_row(
                "SELECT user_id FROM address WHERE id = ?1;",
                [address_id],
                |row| row.get(0),
            )
            .optional()?;

        match owner {
            None => Err(RepoError::AddressNotFound(address_id)),
            Some(owner) if owner != user_id => Err(RepoError::AddressNotOwned {
                address_id,
                user_id,
            }),
            Some(_) => {
                self.conn
                    .execute("DELETE FROM address WHERE id = ?1;", [address_id])?;
                Ok(())
            }
        }
    }

    fn count_addresses(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM address;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative address count {count}")))
    }
}

/// Inserts one address row for an owner already known to exist.
pub(crate) fn insert_address(
    conn: &Connection,
    user_id: UserId,
    address: &NewAddress,
) -> RepoResult<Address> {
    conn.execute(
        "INSERT INTO address (email_address, user_id) VALUES (?1, ?2);",
        params![address.email_address.as_str(), user_id],
    )?;

    Ok(Address {
        id: conn.last_insert_rowid(),
        email_address: address.email_address.clone(),
        user_id,
    })
}

fn collect_addresses(mut rows: rusqlite::Rows<'_>) -> RepoResult<Vec<Address>> {
    let mut addresses = Vec::new();
    while let Some(row) = rows.next()? {
        addresses.push(read_address_row(row)?);
    }
    Ok(addresses)
}

fn read_address_row(row: &Row<'_>) -> RepoResult<Address> {
    let address = Address {
        id: row.get("id")?,
        email_address: row.get("email_address")?,
        user_id: row.get("user_id")?,
    };
    address.validate().map_err(|err| {
        RepoError::InvalidData(format!("address row {} is invalid: {err}", address.id))
    })?;
    Ok(address)
}
