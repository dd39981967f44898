use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::info;

use lingo_core::model::{Category, PracticeSettings, QuizResult, VocabularyEntry};
use storage::repository::{QuizResultRepository, QuizResultRow};

use super::options::build_options;
use super::reveal::{AdvanceCanceller, PendingAdvance, pending_advance};
use crate::Clock;
use crate::catalog_service::CatalogService;
use crate::error::SessionError;
use crate::identity::Identity;
use crate::profile_ledger::{ProfileLedger, StreakBaseline};
use crate::progress_tracker::ProgressTracker;

//
// ─── QUESTIONS & STATE ─────────────────────────────────────────────────────────
//

/// One quiz question: the word to translate and its shuffled answer set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    entry: VocabularyEntry,
    options: Vec<String>,
}

impl QuizQuestion {
    #[must_use]
    pub fn entry(&self) -> &VocabularyEntry {
        &self.entry
    }

    /// Empty when the session holds fewer than four words.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        self.entry.translation()
    }
}

/// Final tally of a completed quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizOutcome {
    pub correct_answers: u32,
    pub total_questions: u32,
    pub xp_earned: u64,
    pub result_id: i64,
}

/// Observable position of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    InProgress { index: usize, correct_count: u32 },
    AwaitingNext {
        index: usize,
        correct_count: u32,
        was_correct: bool,
    },
    Completed(QuizOutcome),
}

/// What `QuizService::advance` moved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizStep {
    Next { index: usize },
    Completed(QuizOutcome),
}

/// Returned once per question when its answer has been scored.
#[derive(Debug)]
pub struct QuizSubmission {
    pub is_correct: bool,
    pub correct_answer: String,
    pub is_last_question: bool,
    /// Resolves when the reveal pause is over; call `advance` afterwards.
    pub advance: PendingAdvance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Question,
    Revealed { was_correct: bool },
    Completed(QuizOutcome),
}

/// Answer whose side effects have not all landed yet.
#[derive(Debug, Clone)]
struct PendingAnswer {
    is_correct: bool,
    xp_awarded: bool,
    attempt_recorded: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct Finalization {
    result_id: Option<i64>,
    streak_updated: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory multiple-choice quiz over a sampled set of words.
#[derive(Debug)]
pub struct QuizSession {
    category: Option<Category>,
    questions: Vec<QuizQuestion>,
    index: usize,
    correct_count: u32,
    xp_per_correct: u32,
    phase: Phase,
    pending: Option<PendingAnswer>,
    finalization: Finalization,
    streak_baseline: Option<StreakBaseline>,
    canceller: Option<AdvanceCanceller>,
    started_at: DateTime<Utc>,
}

impl QuizSession {
    /// Build a session over already-sampled entries.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if `entries` is empty.
    pub fn new<R: Rng + ?Sized>(
        category: Option<Category>,
        entries: Vec<VocabularyEntry>,
        xp_per_correct: u32,
        started_at: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Self, SessionError> {
        if entries.is_empty() {
            return Err(SessionError::Empty);
        }
        let questions = (0..entries.len())
            .map(|i| build_options(&entries, i, rng))
            .collect::<Vec<_>>()
            .into_iter()
            .zip(entries)
            .map(|(options, entry)| QuizQuestion { entry, options })
            .collect();

        Ok(Self {
            category,
            questions,
            index: 0,
            correct_count: 0,
            xp_per_correct,
            phase: Phase::Question,
            pending: None,
            finalization: Finalization::default(),
            streak_baseline: None,
            canceller: None,
            started_at,
        })
    }

    #[must_use]
    pub fn category(&self) -> Option<Category> {
        self.category
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    /// `None` once the quiz is completed.
    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        if self.is_complete() {
            return None;
        }
        self.questions.get(self.index)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.phase, Phase::Completed(_))
    }

    #[must_use]
    pub fn is_revealed(&self) -> bool {
        matches!(self.phase, Phase::Revealed { .. })
    }

    #[must_use]
    pub fn state(&self) -> QuizState {
        match self.phase {
            Phase::Question => QuizState::InProgress {
                index: self.index,
                correct_count: self.correct_count,
            },
            Phase::Revealed { was_correct } => QuizState::AwaitingNext {
                index: self.index,
                correct_count: self.correct_count,
                was_correct,
            },
            Phase::Completed(outcome) => QuizState::Completed(outcome),
        }
    }

    /// `correct_count * xp_per_correct`.
    #[must_use]
    pub fn xp_earned(&self) -> u64 {
        u64::from(self.correct_count) * u64::from(self.xp_per_correct)
    }

    fn is_last_question(&self) -> bool {
        self.index + 1 >= self.questions.len()
    }

    fn total_u32(&self) -> u32 {
        u32::try_from(self.questions.len()).unwrap_or(u32::MAX)
    }

    fn cancel_pending_advance(&mut self) {
        if let Some(canceller) = self.canceller.take() {
            canceller.cancel();
        }
    }
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Starts quizzes and applies their scoring side effects.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    settings: PracticeSettings,
    identity: Arc<dyn Identity>,
    catalog: CatalogService,
    tracker: ProgressTracker,
    ledger: ProfileLedger,
    results: Arc<dyn QuizResultRepository>,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        settings: PracticeSettings,
        identity: Arc<dyn Identity>,
        catalog: CatalogService,
        tracker: ProgressTracker,
        ledger: ProfileLedger,
        results: Arc<dyn QuizResultRepository>,
    ) -> Self {
        Self {
            clock,
            settings,
            identity,
            catalog,
            tracker,
            ledger,
            results,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &PracticeSettings {
        &self.settings
    }

    /// Sample `quiz_length` words and prepare every question's answer set.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` when the catalog has no matching words,
    /// or `SessionError::Catalog` if sampling fails.
    pub async fn start<R: Rng + ?Sized>(
        &self,
        category: Option<Category>,
        rng: &mut R,
    ) -> Result<QuizSession, SessionError> {
        let count = usize::try_from(self.settings.quiz_length()).unwrap_or(usize::MAX);
        let entries = self.catalog.sample(category, count, rng).await?;
        QuizSession::new(
            category,
            entries,
            self.settings.quiz_xp_per_correct(),
            self.clock.now(),
            rng,
        )
    }

    /// Score `answer` against the current question.
    ///
    /// Only the first submission per question counts: once the answer is
    /// revealed, further submissions return `Ok(None)` without touching
    /// storage. After a storage failure the same question can be submitted
    /// again; the original answer is kept and only the effects that did not
    /// land are re-issued.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` for a finished quiz,
    /// `SessionError::NotAuthenticated` when nobody is signed in, and
    /// ledger/progress errors when persistence fails.
    pub async fn submit_answer(
        &self,
        session: &mut QuizSession,
        answer: &str,
    ) -> Result<Option<QuizSubmission>, SessionError> {
        match session.phase {
            Phase::Completed(_) => return Err(SessionError::Completed),
            Phase::Revealed { .. } => return Ok(None),
            Phase::Question => {}
        }
        let Some(question) = session.questions.get(session.index) else {
            return Err(SessionError::Completed);
        };
        let vocabulary_id = question.entry.id();
        let correct_answer = question.correct_answer().to_owned();

        if session.streak_baseline.is_none() {
            session.streak_baseline = Some(self.ledger.streak_baseline().await?);
        }

        let pending = session.pending.get_or_insert_with(|| PendingAnswer {
            is_correct: answer == correct_answer,
            xp_awarded: false,
            attempt_recorded: false,
        });
        let is_correct = pending.is_correct;

        if is_correct && !pending.xp_awarded {
            self.ledger.add_xp(self.settings.quiz_xp_per_correct()).await?;
            if let Some(p) = session.pending.as_mut() {
                p.xp_awarded = true;
            }
        }
        if session.pending.as_ref().is_some_and(|p| !p.attempt_recorded) {
            self.tracker.record_attempt(vocabulary_id, is_correct).await?;
            if let Some(p) = session.pending.as_mut() {
                p.attempt_recorded = true;
            }
        }

        session.pending = None;
        if is_correct {
            session.correct_count += 1;
        }
        session.phase = Phase::Revealed {
            was_correct: is_correct,
        };
        let (advance, canceller) = pending_advance(self.settings.reveal_delay());
        session.cancel_pending_advance();
        session.canceller = Some(canceller);

        Ok(Some(QuizSubmission {
            is_correct,
            correct_answer,
            is_last_question: session.is_last_question(),
            advance,
        }))
    }

    /// Leave the revealed answer: move to the next question, or finalize.
    ///
    /// Finalizing appends the quiz result and updates the streak. Either step
    /// may be retried after a failure; a result already appended is not
    /// appended again.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotRevealed` before the current question is
    /// answered, `SessionError::Completed` after completion, and storage or
    /// ledger errors during finalization.
    pub async fn advance(&self, session: &mut QuizSession) -> Result<QuizStep, SessionError> {
        match session.phase {
            Phase::Completed(_) => return Err(SessionError::Completed),
            Phase::Question => return Err(SessionError::NotRevealed),
            Phase::Revealed { .. } => {}
        }
        session.cancel_pending_advance();

        if !session.is_last_question() {
            session.index += 1;
            session.phase = Phase::Question;
            return Ok(QuizStep::Next {
                index: session.index,
            });
        }

        let outcome = self.finalize(session).await?;
        session.phase = Phase::Completed(outcome);
        Ok(QuizStep::Completed(outcome))
    }

    async fn finalize(&self, session: &mut QuizSession) -> Result<QuizOutcome, SessionError> {
        let xp_earned = session.xp_earned();
        let total_questions = session.total_u32();

        let result_id = match session.finalization.result_id {
            Some(id) => id,
            None => {
                let user_id = self
                    .identity
                    .current_user()
                    .ok_or(SessionError::NotAuthenticated)?;
                let result = QuizResult::new(
                    user_id,
                    session.category,
                    session.correct_count,
                    total_questions,
                    xp_earned,
                    self.clock.now(),
                )?;
                let id = self.results.append_result(&result).await?;
                session.finalization.result_id = Some(id);
                id
            }
        };

        if !session.finalization.streak_updated {
            match session.streak_baseline {
                Some(baseline) => self.ledger.update_streak_from(baseline).await?,
                None => self.ledger.update_streak().await?,
            };
            session.finalization.streak_updated = true;
        }

        info!(
            result_id,
            correct = session.correct_count,
            total = total_questions,
            xp_earned,
            "quiz completed"
        );
        Ok(QuizOutcome {
            correct_answers: session.correct_count,
            total_questions,
            xp_earned,
            result_id,
        })
    }

    /// Throw the session away and start over with freshly sampled words.
    ///
    /// Any pending reveal advance is cancelled.
    ///
    /// # Errors
    ///
    /// Same as `start`; the old session is left untouched on failure.
    pub async fn retry<R: Rng + ?Sized>(
        &self,
        session: &mut QuizSession,
        rng: &mut R,
    ) -> Result<(), SessionError> {
        let fresh = self.start(session.category, rng).await?;
        session.cancel_pending_advance();
        *session = fresh;
        Ok(())
    }

    /// The signed-in user's latest quiz results, newest first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotAuthenticated` or `SessionError::Storage`.
    pub async fn recent_results(&self, limit: u32) -> Result<Vec<QuizResultRow>, SessionError> {
        let user_id = self
            .identity
            .current_user()
            .ok_or(SessionError::NotAuthenticated)?;
        Ok(self.results.list_results(user_id, limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use lingo_core::model::{Difficulty, VocabularyId};
    use lingo_core::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn entries(n: u128) -> Vec<VocabularyEntry> {
        (1..=n)
            .map(|i| {
                VocabularyEntry::new(
                    VocabularyId::from_u128(i),
                    format!("kata{i}"),
                    format!("word{i}"),
                    Category::Daily,
                    Difficulty::Beginner,
                    fixed_now(),
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn empty_sample_is_rejected() {
        let err = QuizSession::new(None, Vec::new(), 15, fixed_now(), &mut StdRng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(err, SessionError::Empty));
    }

    #[test]
    fn every_question_gets_its_own_option_set() {
        let session =
            QuizSession::new(None, entries(6), 15, fixed_now(), &mut StdRng::seed_from_u64(2))
                .unwrap();
        for q in session.questions() {
            assert_eq!(q.options().len(), 4);
            assert!(q.options().iter().any(|o| o == q.correct_answer()));
        }
        assert_eq!(
            session.state(),
            QuizState::InProgress {
                index: 0,
                correct_count: 0
            }
        );
    }

    #[test]
    fn tiny_pool_has_unanswerable_option_sets() {
        let session =
            QuizSession::new(None, entries(2), 15, fixed_now(), &mut StdRng::seed_from_u64(2))
                .unwrap();
        assert!(session.questions().iter().all(|q| q.options().is_empty()));
        assert_eq!(session.total_questions(), 2);
    }
}
