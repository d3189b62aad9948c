use super::{
    APPENDED_EMAIL, APPENDED_USER, CHANGED_EMAIL, JOIN_EMAIL, JOIN_USER, SELECTED_NAMES,
    TOUR_USERS,
};
use crate::db::{DbError, Session};
use crate::model::address::Address;
use crate::model::user::{NewUser, User};
use crate::repo::address_repo::SqliteAddressRepository;
use crate::repo::user_repo::SqliteUserRepository;
use crate::repo::RepoError;
use crate::service::account_service::{AccountService, UserAccount};
use log::{error, info};
use rusqlite::Connection;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

type SqliteAccountService<'conn> =
    AccountService<SqliteUserRepository<'conn>, SqliteAddressRepository<'conn>>;

pub type TourResult<T> = Result<T, TourError>;

/// Tour failure tagged with the step that raised it.
#[derive(Debug)]
pub enum TourError {
    Db { step: &'static str, source: DbError },
    Repo { step: &'static str, source: RepoError },
}

impl TourError {
    pub fn step(&self) -> &'static str {
        match self {
            Self::Db { step, .. } | Self::Repo { step, .. } => step,
        }
    }
}

impl Display for TourError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db { step, source } => write!(f, "tour step `{step}` failed: {source}"),
            Self::Repo { step, source } => write!(f, "tour step `{step}` failed: {source}"),
        }
    }
}

impl Error for TourError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db { source, .. } => Some(source),
            Self::Repo { source, .. } => Some(source),
        }
    }
}

/// Table sizes after the tour finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowCounts {
    pub users: u64,
    pub addresses: u64,
}

/// Rows observed by each tour step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TourReport {
    /// Users and addresses as committed by the insert step.
    pub inserted: Vec<UserAccount>,
    /// Users selected by name membership.
    pub selected: Vec<User>,
    /// Address found through the user join.
    pub joined: Address,
    /// User that received a new address.
    pub appended_to: User,
    pub appended: Address,
    /// Joined address reloaded after its email was changed and committed.
    pub updated: Address,
    /// Address removed from its owner's collection.
    pub removed: Address,
    /// User deleted at the end, addresses cascading.
    pub deleted: User,
    /// Everything left after the final commit.
    pub remaining: Vec<UserAccount>,
    pub counts: RowCounts,
}

/// Runs the full tour on a migrated connection.
///
/// # Side effects
/// - Commits three sessions: insert, change, delete.
/// - Emits one `tour_step` event per step.
pub fn run_tour(conn: &mut Connection) -> TourResult<TourReport> {
    info!("event=tour module=tour status=start");
    let report = run_steps(conn);
    match &report {
        Ok(report) => info!(
            "event=tour module=tour status=ok users={} addresses={}",
            report.counts.users, report.counts.addresses
        ),
        Err(err) => error!(
            "event=tour module=tour status=error step={} error={}",
            err.step(),
            err
        ),
    }
    report
}

fn run_steps(conn: &mut Connection) -> TourResult<TourReport> {
    let inserted = insert_users(conn)?;
    let changes = change_addresses(conn)?;

    let step = "verify";
    let updated = service_for(conn, step)?
        .reload_address(changes.joined.id)
        .map_err(repo_failure(step))?;
    log_step(step, 1);

    let deleted = delete_rows(conn, &updated, &changes.appended_to)?;

    let step = "final";
    let service = service_for(conn, step)?;
    let remaining = service.list_accounts().map_err(repo_failure(step))?;
    let (users, addresses) = service.row_counts().map_err(repo_failure(step))?;
    log_step(step, remaining.len());

    Ok(TourReport {
        inserted,
        selected: changes.selected,
        joined: changes.joined,
        appended_to: changes.appended_to,
        appended: changes.appended,
        removed: updated.clone(),
        updated,
        deleted,
        remaining,
        counts: RowCounts { users, addresses },
    })
}

struct Changes {
    selected: Vec<User>,
    joined: Address,
    appended_to: User,
    appended: Address,
}

fn insert_users(conn: &mut Connection) -> TourResult<Vec<UserAccount>> {
    let step = "insert";
    let session = Session::begin(conn).map_err(db_failure(step))?;
    let inserted = {
        let service = service_for(session.conn(), step)?;
        let users = TOUR_USERS
            .iter()
            .map(|(name, fullname, emails)| {
                emails
                    .iter()
                    .fold(NewUser::new(*name, *fullname), |user, email| {
                        user.with_address(*email)
                    })
            })
            .collect::<Vec<_>>();
        service.add_users(&users).map_err(repo_failure(step))?
    };
    session.commit().map_err(db_failure(step))?;
    log_step(step, inserted.len());
    Ok(inserted)
}

fn change_addresses(conn: &mut Connection) -> TourResult<Changes> {
    let session = Session::begin(conn).map_err(db_failure("select"))?;
    let changes = {
        let service = service_for(session.conn(), "select")?;

        let selected = service
            .users_named(SELECTED_NAMES)
            .map_err(repo_failure("select"))?;
        log_step("select", selected.len());

        let joined = service
            .address_of(JOIN_USER, JOIN_EMAIL)
            .map_err(repo_failure("join"))?;
        log_step("join", 1);

        let step = "change";
        let appended_to = service
            .user_named(APPENDED_USER)
            .map_err(repo_failure(step))?;
        let appended = service
            .append_address(&appended_to, APPENDED_EMAIL)
            .map_err(repo_failure(step))?;
        let mut changed = joined.clone();
        service
            .change_email_address(&mut changed, CHANGED_EMAIL)
            .map_err(repo_failure(step))?;

        Changes {
            selected,
            joined,
            appended_to,
            appended,
        }
    };
    session.commit().map_err(db_failure("change"))?;
    log_step("change", 2);
    Ok(changes)
}

fn delete_rows(conn: &mut Connection, address: &Address, user: &User) -> TourResult<User> {
    let step = "delete";
    let session = Session::begin(conn).map_err(db_failure(step))?;
    {
        let service = service_for(session.conn(), step)?;
        let owner = service
            .reload_user(address.user_id)
            .map_err(repo_failure(step))?;
        service
            .remove_address(&owner, address)
            .map_err(repo_failure(step))?;
        service.delete_user(user).map_err(repo_failure(step))?;
    }
    session.commit().map_err(db_failure(step))?;
    log_step(step, 2);
    Ok(user.clone())
}

fn service_for<'conn>(
    conn: &'conn Connection,
    step: &'static str,
) -> TourResult<SqliteAccountService<'conn>> {
    let users = SqliteUserRepository::try_new(conn).map_err(repo_failure(step))?;
    let addresses = SqliteAddressRepository::try_new(conn).map_err(repo_failure(step))?;
    Ok(AccountService::new(users, addresses))
}

fn log_step(step: &'static str, rows: usize) {
    info!("event=tour_step module=tour status=ok step={step} rows={rows}");
}

fn db_failure(step: &'static str) -> impl FnOnce(DbError) -> TourError {
    move |source| TourError::Db { step, source }
}

fn repo_failure(step: &'static str) -> impl FnOnce(RepoError) -> TourError {
    move |source| TourError::Repo { step, source }
}
