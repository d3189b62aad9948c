//! User repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and filtered lookups over `user_account`.
//! - Insert a new user's pending addresses in the same atomic write.
//!
//! # Invariants
//! - Write paths call `validate()` before SQL mutations.
//! - Deleting a user relies on `ON DELETE CASCADE` to remove its addresses.
//! - List results are ordered by `id ASC`, i.e. insertion order.

use super::address_repo::insert_address;
use super::{ensure_connection_ready, exactly_one, with_savepoint, RepoError, RepoResult};
use crate::model::user::{NewUser, User, UserId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    name,
    fullname
FROM user_account";

/// Query options for listing users.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserListQuery {
    /// Set-membership filter on `name`. `Some(vec![])` matches nothing.
    pub names: Option<Vec<String>>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl UserListQuery {
    /// Matches users whose name is one of `names`.
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: Some(names.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }
}

/// Repository interface for user operations.
pub trait UserRepository {
    /// Inserts the user and its pending addresses; returns the stored row.
    fn create_user(&self, user: &NewUser) -> RepoResult<User>;
    fn update_user(&self, user: &User) -> RepoResult<()>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Returns the single user with `name`; zero or several matches fail.
    fn find_user_by_name(&self, name: &str) -> RepoResult<User>;
    fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<User>>;
    /// Deletes the user; its addresses cascade.
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
    fn count_users(&self) -> RepoResult<u64>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated connection or session view.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &NewUser) -> RepoResult<User> {
        user.validate()?;

        with_savepoint(self.conn, "create_user", || {
            self.conn.execute(
                "INSERT INTO user_account (name, fullname) VALUES (?1, ?2);",
                params![user.name.as_str(), user.fullname.as_deref()],
            )?;
            let id = self.conn.last_insert_rowid();

            for address in &user.addresses {
                insert_address(self.conn, id, address)?;
            }

            Ok(User {
                id,
                name: user.name.clone(),
                fullname: user.fullname.clone(),
            })
        })
    }

    fn update_user(&self, user: &User) -> RepoResult<()> {
        user.validate()?;

        let changed = self.conn.execute(
            "UPDATE user_account
             SET
                name = ?1,
                fullname = ?2
             WHERE id = ?3;",
            params![user.name.as_str(), user.fullname.as_deref(), user.id],
        )?;

        if changed == 0 {
            return Err(RepoError::UserNotFound(user.id));
        }

        Ok(())
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let user = stmt
            .query_row([id], |row| Ok(read_user_row(row)))
            .optional()?;
        user.transpose()
    }

    fn find_user_by_name(&self, name: &str) -> RepoResult<User> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE name = ?1 ORDER BY id ASC;"))?;
        let mut rows = stmt.query([name])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(read_user_row(row)?);
        }

        exactly_one(users, format!("user_account.name = '{name}'"))
    }

    fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<User>> {
        let mut sql = format!("{USER_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(names) = query.names.as_ref() {
            if names.is_empty() {
                return Ok(Vec::new());
            }
            let placeholders = vec!["?"; names.len()].join(", ");
            sql.push_str(&format!(" AND name IN ({placeholders})"));
            bind_values.extend(names.iter().cloned().map(Value::Text));
        }

        sql.push_str(" ORDER BY id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut users = Vec::new();

        while let Some(row) = rows.next()? {
            users.push(read_user_row(row)?);
        }

        Ok(users)
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM user_account WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::UserNotFound(id));
        }

        Ok(())
    }

    fn count_users(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM user_account;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative user count {count}")))
    }
}

pub(crate) fn user_exists(conn: &Connection, id: UserId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM user_account WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn read_user_row(row: &Row<'_>) -> RepoResult<User> {
    let user = User {
        id: row.get("id")?,
        name: row.get("name")?,
        fullname: row.get("fullname")?,
    };
    user.validate().map_err(|err| {
        RepoError::InvalidData(format!("user_account row {} is invalid: {err}", user.id))
    })?;
    Ok(user)
}
