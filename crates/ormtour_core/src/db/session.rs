//! Unit-of-work scope over one SQLite connection.
//!
//! # Invariants
//! - Writes made through [`Session::conn`] become durable only on
//!   [`Session::commit`].
//! - Dropping a session without committing rolls every write back.

use super::DbResult;
use log::{debug, error, info};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::time::Instant;

/// Write transaction borrowed from an open connection.
pub struct Session<'conn> {
    tx: Transaction<'conn>,
    started_at: Instant,
}

impl<'conn> Session<'conn> {
    /// Begins an immediate write transaction on `conn`.
    pub fn begin(conn: &'conn mut Connection) -> DbResult<Self> {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        debug!("event=session_begin module=db status=ok");
        Ok(Self {
            tx,
            started_at: Instant::now(),
        })
    }

    /// Connection view used by repositories for work inside this session.
    pub fn conn(&self) -> &Connection {
        &self.tx
    }

    /// Makes all pending writes durable.
    pub fn commit(self) -> DbResult<()> {
        let started_at = self.started_at;
        match self.tx.commit() {
            Ok(()) => {
                info!(
                    "event=session_commit module=db status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=session_commit module=db status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Discards all pending writes.
    pub fn rollback(self) -> DbResult<()> {
        self.tx.rollback()?;
        info!("event=session_rollback module=db status=ok");
        Ok(())
    }
}
