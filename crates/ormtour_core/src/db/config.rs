//! Engine configuration parsed from SQLAlchemy-style URLs.

use super::{DbError, DbResult};
use std::path::PathBuf;

const SQLITE_SCHEME: &str = "sqlite://";
const MEMORY_PATH: &str = ":memory:";

/// Where the engine keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineTarget {
    /// Private in-memory database, gone when the connection closes.
    Memory,
    /// SQLite database file.
    File(PathBuf),
}

impl EngineTarget {
    /// Parses `sqlite://`, `sqlite:///:memory:` and `sqlite:///<path>`.
    ///
    /// `sqlite:///data.db` is relative to the working directory and
    /// `sqlite:////tmp/data.db` is absolute, matching SQLAlchemy.
    pub fn parse_url(url: &str) -> DbResult<Self> {
        let trimmed = url.trim();
        let rest = trimmed
            .strip_prefix(SQLITE_SCHEME)
            .ok_or_else(|| DbError::InvalidEngineUrl(trimmed.to_string()))?;

        if rest.is_empty() {
            return Ok(Self::Memory);
        }

        let path = rest
            .strip_prefix('/')
            .ok_or_else(|| DbError::InvalidEngineUrl(trimmed.to_string()))?;
        match path {
            "" => Err(DbError::InvalidEngineUrl(trimmed.to_string())),
            MEMORY_PATH => Ok(Self::Memory),
            other => Ok(Self::File(PathBuf::from(other))),
        }
    }
}

/// Options for [`open_engine`](super::open_engine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Engine URL, e.g. `sqlite://` or `sqlite:///accounts.db`.
    pub url: String,
    /// Log every SQL statement executed on the connection.
    pub echo: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            url: SQLITE_SCHEME.to_string(),
            echo: false,
        }
    }
}

impl EngineConfig {
    /// Resolves the configured URL into an engine target.
    pub fn target(&self) -> DbResult<EngineTarget> {
        EngineTarget::parse_url(&self.url)
    }
}
