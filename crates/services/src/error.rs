//! Shared error types for the services crate.

use thiserror::Error;

use lingo_core::model::{ProfileError, QuizResultError, UserId, VocabularyId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ProgressTracker`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("no user is signed in")]
    NotAuthenticated,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProfileLedger`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LedgerError {
    #[error("no user is signed in")]
    NotAuthenticated,
    #[error("no profile exists for user {0}")]
    ProfileMissing(UserId),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CatalogService` and `FavoritesService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("no user is signed in")]
    NotAuthenticated,
    #[error("vocabulary entry {0} does not exist")]
    UnknownWord(VocabularyId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AccountService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AccountError {
    #[error("no profile exists for user {0}")]
    UnknownUser(UserId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by quiz and flashcard sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no vocabulary available for session")]
    Empty,
    #[error("session already completed")]
    Completed,
    #[error("current question has not been answered yet")]
    NotRevealed,
    #[error("no user is signed in")]
    NotAuthenticated,
    #[error(transparent)]
    QuizResult(#[from] QuizResultError),
    #[error(transparent)]
    Progress(ProgressError),
    #[error(transparent)]
    Ledger(LedgerError),
    #[error(transparent)]
    Catalog(CatalogError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<ProgressError> for SessionError {
    fn from(err: ProgressError) -> Self {
        match err {
            ProgressError::NotAuthenticated => Self::NotAuthenticated,
            other => Self::Progress(other),
        }
    }
}

impl From<LedgerError> for SessionError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotAuthenticated => Self::NotAuthenticated,
            other => Self::Ledger(other),
        }
    }
}

impl From<CatalogError> for SessionError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotAuthenticated => Self::NotAuthenticated,
            other => Self::Catalog(other),
        }
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
