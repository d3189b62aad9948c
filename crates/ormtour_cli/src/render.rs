//! Plain-text rendering of a tour report.

use ormtour_core::{TourReport, UserAccount};
use std::fmt::Write;

/// Renders each step as a `== step` header followed by its rows.
pub fn render_report(report: &TourReport) -> String {
    let mut out = String::new();

    section(&mut out, "insert");
    for account in &report.inserted {
        account_lines(&mut out, account);
    }

    section(&mut out, "select name in (spongebob, sandy)");
    for user in &report.selected {
        line(&mut out, 0, user);
    }

    section(&mut out, "select address join user");
    line(&mut out, 0, &report.joined);

    section(&mut out, "change");
    line(&mut out, 0, &report.appended_to);
    line(&mut out, 1, &report.appended);
    line(&mut out, 0, &report.updated);

    section(&mut out, "delete");
    line(&mut out, 0, &report.removed);
    line(&mut out, 0, &report.deleted);

    section(&mut out, "remaining");
    for account in &report.remaining {
        account_lines(&mut out, account);
    }
    let _ = writeln!(
        out,
        "users={} addresses={}",
        report.counts.users, report.counts.addresses
    );

    out
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "== {title}");
}

fn account_lines(out: &mut String, account: &UserAccount) {
    line(out, 0, &account.user);
    for address in &account.addresses {
        line(out, 1, address);
    }
}

fn line(out: &mut String, depth: usize, row: &dyn std::fmt::Display) {
    let _ = writeln!(out, "{}{row}", "  ".repeat(depth));
}
