//! Users, their addresses, and the SQLite persistence underneath them.
//! This crate is the single source of truth for account invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod tour;

pub use db::{open_db, open_db_in_memory, open_engine, DbError, EngineConfig, Session};
pub use logging::{
    default_log_level, flush_logs, init_logging, logging_status, LogConfig, LogLevel,
};
pub use model::address::{Address, AddressId, NewAddress};
pub use model::user::{NewUser, User, UserId};
pub use model::{ModelValidationError, USER_NAME_MAX_CHARS};
pub use repo::address_repo::{AddressRepository, SqliteAddressRepository};
pub use repo::user_repo::{SqliteUserRepository, UserListQuery, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::account_service::{AccountService, UserAccount};
pub use tour::{run_tour, RowCounts, TourError, TourReport, TourResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
