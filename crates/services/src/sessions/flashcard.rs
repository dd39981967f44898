use rand::Rng;
use tracing::info;

use lingo_core::model::{Category, PracticeSettings, VocabularyEntry};

use crate::Clock;
use crate::catalog_service::CatalogService;
use crate::error::SessionError;
use crate::profile_ledger::{ProfileLedger, StreakBaseline};
use crate::progress_tracker::ProgressTracker;

/// Whether the user judged the shown claim correctly.
#[must_use]
pub fn judge(is_correct_claim: bool, user_says_true: bool) -> bool {
    is_correct_claim == user_says_true
}

/// A word shown with a translation that may or may not be its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flashcard {
    entry: VocabularyEntry,
    shown_translation: String,
    is_correct_claim: bool,
}

impl Flashcard {
    #[must_use]
    pub fn entry(&self) -> &VocabularyEntry {
        &self.entry
    }

    #[must_use]
    pub fn shown_translation(&self) -> &str {
        &self.shown_translation
    }

    #[must_use]
    pub fn is_correct_claim(&self) -> bool {
        self.is_correct_claim
    }
}

/// Pair every entry with a claim: half the time its own translation, half the
/// time one borrowed from another entry of the same set.
pub fn build_cards<R: Rng + ?Sized>(entries: Vec<VocabularyEntry>, rng: &mut R) -> Vec<Flashcard> {
    let len = entries.len();
    let shown: Vec<String> = (0..len)
        .map(|i| {
            if len > 1 && rng.random_bool(0.5) {
                let j = rng.random_range(0..len - 1);
                let j = if j >= i { j + 1 } else { j };
                entries[j].translation().to_owned()
            } else {
                entries[i].translation().to_owned()
            }
        })
        .collect();

    entries
        .into_iter()
        .zip(shown)
        .map(|(entry, shown_translation)| Flashcard {
            is_correct_claim: shown_translation == entry.translation(),
            entry,
            shown_translation,
        })
        .collect()
}

/// Scored result of one judgment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgmentOutcome {
    pub user_is_right: bool,
    pub is_correct_claim: bool,
    pub true_translation: String,
    pub is_complete: bool,
}

#[derive(Debug, Clone, Copy)]
struct PendingJudgment {
    user_is_right: bool,
    attempt_recorded: bool,
    xp_awarded: bool,
    streak_updated: bool,
}

/// In-memory true/false flashcard run.
#[derive(Debug)]
pub struct FlashcardSession {
    category: Option<Category>,
    cards: Vec<Flashcard>,
    index: usize,
    correct_count: u32,
    flipped: bool,
    pending: Option<PendingJudgment>,
    streak_baseline: Option<StreakBaseline>,
}

impl FlashcardSession {
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if `entries` is empty.
    pub fn new<R: Rng + ?Sized>(
        category: Option<Category>,
        entries: Vec<VocabularyEntry>,
        rng: &mut R,
    ) -> Result<Self, SessionError> {
        if entries.is_empty() {
            return Err(SessionError::Empty);
        }
        Ok(Self {
            category,
            cards: build_cards(entries, rng),
            index: 0,
            correct_count: 0,
            flipped: false,
            pending: None,
            streak_baseline: None,
        })
    }

    #[must_use]
    pub fn current_card(&self) -> Option<&Flashcard> {
        self.cards.get(self.index)
    }

    #[must_use]
    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.index >= self.cards.len()
    }

    /// Turn the current card over; returns the new face state.
    pub fn flip(&mut self) -> bool {
        if !self.is_complete() {
            self.flipped = !self.flipped;
        }
        self.flipped
    }
}

/// Starts flashcard runs and applies their scoring side effects.
#[derive(Clone)]
pub struct FlashcardService {
    clock: Clock,
    settings: PracticeSettings,
    catalog: CatalogService,
    tracker: ProgressTracker,
    ledger: ProfileLedger,
}

impl FlashcardService {
    #[must_use]
    pub fn new(
        clock: Clock,
        settings: PracticeSettings,
        catalog: CatalogService,
        tracker: ProgressTracker,
        ledger: ProfileLedger,
    ) -> Self {
        Self {
            clock,
            settings,
            catalog,
            tracker,
            ledger,
        }
    }

    /// # Errors
    ///
    /// Returns `SessionError::Empty` when the catalog has no matching words,
    /// or `SessionError::Catalog` if sampling fails.
    pub async fn start<R: Rng + ?Sized>(
        &self,
        category: Option<Category>,
        rng: &mut R,
    ) -> Result<FlashcardSession, SessionError> {
        let count = usize::try_from(self.settings.flashcard_length()).unwrap_or(usize::MAX);
        let entries = self.catalog.sample(category, count, rng).await?;
        FlashcardSession::new(category, entries, rng)
    }

    /// Score the user's true/false call on the current card and move on.
    ///
    /// The attempt is recorded either way; a right call also earns XP. The
    /// last card additionally updates the streak. Counters and position only
    /// change once every effect has landed, so a failed call can be repeated
    /// and re-issues just the missing effects with the original judgment.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after the last card,
    /// `SessionError::NotAuthenticated` when nobody is signed in, and
    /// ledger/progress errors when persistence fails.
    pub async fn submit_judgment(
        &self,
        session: &mut FlashcardSession,
        user_says_true: bool,
    ) -> Result<JudgmentOutcome, SessionError> {
        let Some(card) = session.cards.get(session.index) else {
            return Err(SessionError::Completed);
        };
        let vocabulary_id = card.entry.id();
        let is_correct_claim = card.is_correct_claim;
        let true_translation = card.entry.translation().to_owned();
        let is_last = session.index + 1 == session.cards.len();

        if session.streak_baseline.is_none() {
            session.streak_baseline = Some(self.ledger.streak_baseline().await?);
        }

        let mut pending = *session.pending.get_or_insert(PendingJudgment {
            user_is_right: judge(is_correct_claim, user_says_true),
            attempt_recorded: false,
            xp_awarded: false,
            streak_updated: false,
        });
        let user_is_right = pending.user_is_right;

        if !pending.attempt_recorded {
            self.tracker.record_attempt(vocabulary_id, user_is_right).await?;
            pending.attempt_recorded = true;
            session.pending = Some(pending);
        }
        if user_is_right && !pending.xp_awarded {
            self.ledger
                .add_xp(self.settings.flashcard_xp_per_correct())
                .await?;
            pending.xp_awarded = true;
            session.pending = Some(pending);
        }
        if is_last && !pending.streak_updated {
            match session.streak_baseline {
                Some(baseline) => self.ledger.update_streak_from(baseline).await?,
                None => self.ledger.update_streak().await?,
            };
            pending.streak_updated = true;
            session.pending = Some(pending);
        }

        session.pending = None;
        if user_is_right {
            session.correct_count += 1;
        }
        session.index += 1;
        session.flipped = false;

        if is_last {
            info!(
                correct = session.correct_count,
                total = session.cards.len(),
                at = %self.clock.now(),
                "flashcards completed"
            );
        }

        Ok(JudgmentOutcome {
            user_is_right,
            is_correct_claim,
            true_translation,
            is_complete: session.is_complete(),
        })
    }

    /// Start over with freshly sampled cards.
    ///
    /// # Errors
    ///
    /// Same as `start`; the old session is left untouched on failure.
    pub async fn restart<R: Rng + ?Sized>(
        &self,
        session: &mut FlashcardSession,
        rng: &mut R,
    ) -> Result<(), SessionError> {
        *session = self.start(session.category, rng).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use lingo_core::model::{Difficulty, VocabularyId};
    use lingo_core::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn entries(translations: &[&str]) -> Vec<VocabularyEntry> {
        translations
            .iter()
            .zip(1_u128..)
            .map(|(t, n)| {
                VocabularyEntry::new(
                    VocabularyId::from_u128(n),
                    format!("kata{n}"),
                    *t,
                    Category::Colors,
                    Difficulty::Beginner,
                    fixed_now(),
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn judgment_truth_table() {
        assert!(judge(true, true));
        assert!(!judge(true, false));
        assert!(!judge(false, true));
        assert!(judge(false, false));
    }

    #[test]
    fn single_card_always_shows_true_translation() {
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..50 {
            let cards = build_cards(entries(&["red"]), &mut rng);
            assert!(cards[0].is_correct_claim());
            assert_eq!(cards[0].shown_translation(), "red");
        }
    }

    #[test]
    fn claims_are_flagged_consistently() {
        let pool = entries(&["red", "blue", "green", "black", "white"]);
        let mut rng = StdRng::seed_from_u64(17);
        let mut saw_false = false;
        let mut saw_true = false;

        for _ in 0..40 {
            for card in build_cards(pool.clone(), &mut rng) {
                assert_eq!(
                    card.is_correct_claim(),
                    card.shown_translation() == card.entry().translation()
                );
                assert!(pool.iter().any(|e| e.translation() == card.shown_translation()));
                saw_false |= !card.is_correct_claim();
                saw_true |= card.is_correct_claim();
            }
        }
        assert!(saw_false && saw_true);
    }

    #[test]
    fn borrowed_duplicate_translation_counts_as_true() {
        let pool = entries(&["hello", "hello"]);
        let mut rng = StdRng::seed_from_u64(4);
        for card in build_cards(pool, &mut rng) {
            assert!(card.is_correct_claim());
        }
    }

    #[test]
    fn flip_toggles_until_complete() {
        let mut session =
            FlashcardSession::new(None, entries(&["red"]), &mut StdRng::seed_from_u64(1)).unwrap();
        assert!(session.flip());
        assert!(!session.flip());
        assert!(!session.is_complete());
    }
}
