//! Error classification for trash use-cases.
//!
//! Lifecycle no-ops (missing row, foreign owner, wrong state) are not errors;
//! they surface as `Ok(false)` from the engines.

use crate::model::entity::EntityRefError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TrashServiceResult<T> = Result<T, TrashServiceError>;

/// Service error for trash use-cases.
#[derive(Debug)]
pub enum TrashServiceError {
    /// Unknown kind tag, malformed id/date, or blank owner id.
    InvalidArgument(String),
    /// A write broke a uniqueness rule that the lifecycle guards did not
    /// catch, e.g. a concurrent seeding path claiming the same journal day.
    ConstraintViolation(String),
    /// Backing store failure. Not retried by core.
    Repo(RepoError),
}

impl Display for TrashServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::ConstraintViolation(message) => write!(f, "constraint violation: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TrashServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TrashServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ConstraintViolation(message) => Self::ConstraintViolation(message),
            other => Self::Repo(other),
        }
    }
}

impl From<rusqlite::Error> for TrashServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

impl From<EntityRefError> for TrashServiceError {
    fn from(value: EntityRefError) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}

/// Rejects blank owner ids before any store is touched.
pub(crate) fn require_owner(owner_id: &str) -> TrashServiceResult<&str> {
    if owner_id.trim().is_empty() {
        return Err(TrashServiceError::InvalidArgument(
            "owner id must not be blank".to_string(),
        ));
    }
    Ok(owner_id)
}
