use std::sync::Arc;

use lingo_core::model::{MasteryLevel, OverallProgress, ProgressRecord, UserId, VocabularyId};
use storage::repository::ProgressRepository;
use tracing::{debug, warn};

use crate::Clock;
use crate::error::ProgressError;
use crate::identity::Identity;

/// Folds practice attempts into per-word mastery for the signed-in user.
#[derive(Clone)]
pub struct ProgressTracker {
    clock: Clock,
    identity: Arc<dyn Identity>,
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressTracker {
    #[must_use]
    pub fn new(
        clock: Clock,
        identity: Arc<dyn Identity>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            clock,
            identity,
            progress,
        }
    }

    fn user(&self) -> Result<UserId, ProgressError> {
        self.identity
            .current_user()
            .ok_or(ProgressError::NotAuthenticated)
    }

    /// Record one attempt on a word and persist the updated counters.
    ///
    /// The first attempt creates the record with seeded mastery; later attempts
    /// recompute mastery from the updated counts.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::NotAuthenticated` before touching storage when
    /// nobody is signed in, and `ProgressError::Storage` if persistence fails.
    pub async fn record_attempt(
        &self,
        vocabulary_id: VocabularyId,
        was_correct: bool,
    ) -> Result<ProgressRecord, ProgressError> {
        let user_id = self.user()?;
        let now = self.clock.now();

        let record = match self.progress.get_progress(user_id, vocabulary_id).await? {
            Some(mut record) => {
                record.apply_attempt(was_correct, now);
                self.progress.update_progress(&record).await.inspect_err(|e| {
                    warn!(%user_id, %vocabulary_id, error = %e, "progress update failed");
                })?;
                record
            }
            None => {
                let record =
                    ProgressRecord::first_attempt(user_id, vocabulary_id, was_correct, now);
                self.progress.insert_progress(&record).await.inspect_err(|e| {
                    warn!(%user_id, %vocabulary_id, error = %e, "progress insert failed");
                })?;
                record
            }
        };

        debug!(
            %user_id,
            %vocabulary_id,
            was_correct,
            practiced = record.times_practiced(),
            correct = record.times_correct(),
            mastery = record.mastery_level().value(),
            "attempt recorded"
        );
        Ok(record)
    }

    /// Totals across every word the user has practiced.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::NotAuthenticated` or `ProgressError::Storage`.
    pub async fn overall_progress(&self) -> Result<OverallProgress, ProgressError> {
        let records = self.list().await?;
        Ok(OverallProgress::from_records(&records))
    }

    /// Mastery on one word; zero when it was never practiced.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::NotAuthenticated` or `ProgressError::Storage`.
    pub async fn mastery_level(
        &self,
        vocabulary_id: VocabularyId,
    ) -> Result<MasteryLevel, ProgressError> {
        let user_id = self.user()?;
        let record = self.progress.get_progress(user_id, vocabulary_id).await?;
        Ok(record.map_or(MasteryLevel::ZERO, |r| r.mastery_level()))
    }

    /// # Errors
    ///
    /// Returns `ProgressError::NotAuthenticated` or `ProgressError::Storage`.
    pub async fn list(&self) -> Result<Vec<ProgressRecord>, ProgressError> {
        let user_id = self.user()?;
        Ok(self.progress.list_progress(user_id).await?)
    }
}
