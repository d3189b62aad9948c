//! Scripted walk through the account model.
//!
//! # Responsibility
//! - Run the fixed insert/select/update/delete sequence on a migrated
//!   connection.
//! - Report what every step observed so callers can print or assert on it.
//!
//! # Invariants
//! - Steps run in order; the first failure aborts the tour and the open
//!   session rolls back.
//! - Each session commits only after all of its steps succeeded.

mod script;

pub use script::{run_tour, RowCounts, TourError, TourReport, TourResult};

/// Users inserted by the first step, as `(name, fullname, addresses)`.
pub const TOUR_USERS: &[(&str, &str, &[&str])] = &[
    (
        "spongebob",
        "Spongebob Squarepants",
        &["spongebob@sqlalchemy.org"],
    ),
    (
        "sandy",
        "Sandy Cheeks",
        &["sandy@sqlalchemy.org", "sandy@squirrelpower.org"],
    ),
    ("patrick", "Patrick Star", &[]),
];

pub const SELECTED_NAMES: &[&str] = &["spongebob", "sandy"];
pub const JOIN_USER: &str = "sandy";
pub const JOIN_EMAIL: &str = "sandy@sqlalchemy.org";
pub const APPENDED_USER: &str = "patrick";
pub const APPENDED_EMAIL: &str = "patrickstar@sqlalchemy.org";
pub const CHANGED_EMAIL: &str = "sandy_cheeks@sqlalchemy.org";
