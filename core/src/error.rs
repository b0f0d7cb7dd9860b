//! Errors surfaced by [`crate::Tracker`] operations.

use crate::profiles::ProfileError;
use crate::store::StoreError;
use crate::validate::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid entry: {0}")]
    Validation(#[from] ValidationError),

    #[error("Duplicate {0}: one already exists for this user, date and type")]
    Duplicate(&'static str),

    #[error(transparent)]
    NotFound(#[from] StoreError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error("Entry belongs to another user")]
    Unauthorized,

    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl Error {
    /// True for lookups that found nothing, which the CLI reports with a distinct exit code.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::Profile(ProfileError::UserNotFound(_))
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
