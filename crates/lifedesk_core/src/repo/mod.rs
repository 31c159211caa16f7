//! Entity stores: per-kind persistence with soft-delete primitives.
//!
//! # Responsibility
//! - Define the `EntityStore` lifecycle contract shared by all four kinds.
//! - Isolate SQLite query details from the trash engines.
//!
//! # Invariants
//! - Every query filters by `owner_id`; a foreign id is indistinguishable
//!   from a missing one.
//! - Lifecycle no-ops are `Ok(false)`, never errors.
//! - Active-listing reads never return trashed rows.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod folder_store;
pub mod journal_store;
pub mod lifecycle;
pub mod note_store;
pub mod task_store;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from entity store operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// A write would break a uniqueness rule, e.g. two active journal pages
    /// on one date.
    ConstraintViolation(String),
    /// A referenced entity is missing. Only raised by seeding paths; the
    /// lifecycle primitives report missing rows as `Ok(false)`.
    NotFound(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::ConstraintViolation(message) => write!(f, "constraint violation: {message}"),
            Self::NotFound(what) => write!(f, "not found: {what}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "entity store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "entity store requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
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
