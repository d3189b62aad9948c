//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for users/addresses.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must validate model constraints before persistence.
//! - Repository APIs return semantic errors (`UserNotFound`,
//!   `NoResultFound`, ...) in addition to DB transport errors.
//! - Repositories refuse connections whose schema is not fully migrated.

pub mod address_repo;
pub mod user_repo;

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::address::AddressId;
use crate::model::user::UserId;
use crate::model::ModelValidationError;
use log::error;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for account persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ModelValidationError),
    Db(DbError),
    UserNotFound(UserId),
    AddressNotFound(AddressId),
    /// Address exists but belongs to a different user's collection.
    AddressNotOwned {
        address_id: AddressId,
        user_id: UserId,
    },
    /// Exactly-one lookup matched no rows.
    NoResultFound(String),
    /// Exactly-one lookup matched several rows.
    MultipleResultsFound { query: String, count: usize },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::AddressNotFound(id) => write!(f, "address not found: {id}"),
            Self::AddressNotOwned {
                address_id,
                user_id,
            } => write!(f, "address {address_id} does not belong to user {user_id}"),
            Self::NoResultFound(query) => write!(f, "no row found for {query}"),
            Self::MultipleResultsFound { query, count } => {
                write!(f, "expected one row for {query}, found {count}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "account repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "account repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "account repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted account data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("user_account", &["id", "name", "fullname"]),
    ("address", &["id", "email_address", "user_id"]),
];

/// Reduces a list of matches to exactly one row.
pub(crate) fn exactly_one<T>(mut rows: Vec<T>, query: impl Into<String>) -> RepoResult<T> {
    match rows.len() {
        0 => Err(RepoError::NoResultFound(query.into())),
        1 => Ok(rows.remove(0)),
        count => Err(RepoError::MultipleResultsFound {
            query: query.into(),
            count,
        }),
    }
}

/// Runs `work` inside a named savepoint so multi-row writes are atomic
/// whether or not the caller already holds a transaction.
///
/// A failing `work` error is returned even when the rollback itself fails.
pub(crate) fn with_savepoint<T>(
    conn: &Connection,
    name: &str,
    work: impl FnOnce() -> RepoResult<T>,
) -> RepoResult<T> {
    conn.execute_batch(&format!("SAVEPOINT {name};"))?;
    match work() {
        Ok(value) => {
            conn.execute_batch(&format!("RELEASE {name};"))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) =
                conn.execute_batch(&format!("ROLLBACK TO {name}; RELEASE {name};"))
            {
                error!(
                    "event=savepoint_rollback module=repo status=error savepoint={} error={} cause={}",
                    name, rollback_err, err
                );
            }
            Err(err)
        }
    }
}

pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
