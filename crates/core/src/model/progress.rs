use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{UserId, VocabularyId};

/// Highest mastery a word can reach.
pub const MAX_MASTERY: u8 = 5;

/// Mastery at or above this level counts a word as mastered.
pub const MASTERED_THRESHOLD: u8 = 4;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressRecordError {
    #[error("times_correct ({correct}) exceeds times_practiced ({practiced})")]
    CorrectExceedsPracticed { correct: u32, practiced: u32 },

    #[error("mastery level {0} is out of range 0..=5")]
    MasteryOutOfRange(u8),
}

//
// ─── MASTERY ───────────────────────────────────────────────────────────────────
//

/// Integer 0..=5 summarizing historical accuracy on one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct MasteryLevel(u8);

impl MasteryLevel {
    pub const ZERO: MasteryLevel = MasteryLevel(0);

    /// # Errors
    ///
    /// Returns `ProgressRecordError::MasteryOutOfRange` above `MAX_MASTERY`.
    pub fn new(value: u8) -> Result<Self, ProgressRecordError> {
        if value > MAX_MASTERY {
            return Err(ProgressRecordError::MasteryOutOfRange(value));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn is_mastered(self) -> bool {
        self.0 >= MASTERED_THRESHOLD
    }
}

impl TryFrom<u8> for MasteryLevel {
    type Error = ProgressRecordError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MasteryLevel> for u8 {
    fn from(level: MasteryLevel) -> Self {
        level.0
    }
}

/// Mastery for the given counters.
///
/// The first attempt seeds mastery at 1 when correct (0 otherwise) instead of
/// applying the accuracy formula. Every later attempt uses
/// `floor(min(5, 5 * correct / practiced))`.
#[must_use]
pub fn derive_mastery(correct: u32, practiced: u32, is_first_attempt: bool) -> MasteryLevel {
    if is_first_attempt {
        return MasteryLevel(u8::from(correct > 0));
    }
    if practiced == 0 {
        return MasteryLevel::ZERO;
    }
    let scaled = u64::from(correct) * u64::from(MAX_MASTERY) / u64::from(practiced);
    let capped = scaled.min(u64::from(MAX_MASTERY));
    // capped <= 5
    MasteryLevel(u8::try_from(capped).unwrap_or(MAX_MASTERY))
}

//
// ─── PROGRESS RECORD ───────────────────────────────────────────────────────────
//

/// Per-(user, word) practice counters and cached mastery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    user_id: UserId,
    vocabulary_id: VocabularyId,
    times_practiced: u32,
    times_correct: u32,
    mastery_level: MasteryLevel,
    last_practiced_at: Option<DateTime<Utc>>,
}

impl ProgressRecord {
    /// Record created by the very first attempt on a word.
    #[must_use]
    pub fn first_attempt(
        user_id: UserId,
        vocabulary_id: VocabularyId,
        was_correct: bool,
        at: DateTime<Utc>,
    ) -> Self {
        let times_correct = u32::from(was_correct);
        Self {
            user_id,
            vocabulary_id,
            times_practiced: 1,
            times_correct,
            mastery_level: derive_mastery(times_correct, 1, true),
            last_practiced_at: Some(at),
        }
    }

    /// Rehydrate a record from persisted storage.
    ///
    /// Mastery is trusted as stored; seed records carry a value the formula
    /// would not reproduce.
    ///
    /// # Errors
    ///
    /// Returns `ProgressRecordError::CorrectExceedsPracticed` for impossible counters.
    pub fn from_persisted(
        user_id: UserId,
        vocabulary_id: VocabularyId,
        times_practiced: u32,
        times_correct: u32,
        mastery_level: MasteryLevel,
        last_practiced_at: Option<DateTime<Utc>>,
    ) -> Result<Self, ProgressRecordError> {
        if times_correct > times_practiced {
            return Err(ProgressRecordError::CorrectExceedsPracticed {
                correct: times_correct,
                practiced: times_practiced,
            });
        }
        Ok(Self {
            user_id,
            vocabulary_id,
            times_practiced,
            times_correct,
            mastery_level,
            last_practiced_at,
        })
    }

    /// Fold one more attempt into the counters and recompute mastery.
    pub fn apply_attempt(&mut self, was_correct: bool, at: DateTime<Utc>) {
        self.times_practiced = self.times_practiced.saturating_add(1);
        if was_correct {
            self.times_correct = self.times_correct.saturating_add(1);
        }
        self.mastery_level = derive_mastery(self.times_correct, self.times_practiced, false);
        self.last_practiced_at = Some(at);
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn vocabulary_id(&self) -> VocabularyId {
        self.vocabulary_id
    }

    #[must_use]
    pub fn times_practiced(&self) -> u32 {
        self.times_practiced
    }

    #[must_use]
    pub fn times_correct(&self) -> u32 {
        self.times_correct
    }

    #[must_use]
    pub fn mastery_level(&self) -> MasteryLevel {
        self.mastery_level
    }

    #[must_use]
    pub fn last_practiced_at(&self) -> Option<DateTime<Utc>> {
        self.last_practiced_at
    }
}

//
// ─── OVERALL PROGRESS ──────────────────────────────────────────────────────────
//

/// Aggregate over all of a user's progress records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverallProgress {
    pub total_words: u32,
    pub mastered_words: u32,
    pub percentage: u32,
}

impl OverallProgress {
    /// Percentage is rounded half up; an empty set yields all zeros.
    #[must_use]
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ProgressRecord>) -> Self {
        let mut total = 0_u32;
        let mut mastered = 0_u32;
        for record in records {
            total = total.saturating_add(1);
            if record.mastery_level().is_mastered() {
                mastered = mastered.saturating_add(1);
            }
        }
        if total == 0 {
            return Self::default();
        }

        let total64 = u64::from(total);
        let percentage = (200 * u64::from(mastered) + total64) / (2 * total64);

        Self {
            total_words: total,
            mastered_words: mastered,
            percentage: u32::try_from(percentage).unwrap_or(100),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn record_with(practiced: u32, correct: u32, mastery: u8) -> ProgressRecord {
        ProgressRecord::from_persisted(
            UserId::random(),
            VocabularyId::random(),
            practiced,
            correct,
            MasteryLevel::new(mastery).unwrap(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn first_attempt_seeds_mastery() {
        let user = UserId::random();
        let word = VocabularyId::random();

        let wrong = ProgressRecord::first_attempt(user, word, false, fixed_now());
        assert_eq!(wrong.mastery_level().value(), 0);
        assert_eq!(wrong.times_practiced(), 1);
        assert_eq!(wrong.times_correct(), 0);

        let right = ProgressRecord::first_attempt(user, word, true, fixed_now());
        assert_eq!(right.mastery_level().value(), 1);
        assert_ne!(
            right.mastery_level(),
            derive_mastery(1, 1, false),
            "seed value must differ from the steady-state formula"
        );
    }

    #[test]
    fn steady_state_formula_truncates() {
        assert_eq!(derive_mastery(3, 4, false).value(), 3);
        assert_eq!(derive_mastery(2, 3, false).value(), 3);
        assert_eq!(derive_mastery(1, 3, false).value(), 1);
        assert_eq!(derive_mastery(0, 7, false).value(), 0);
        assert_eq!(derive_mastery(9, 9, false).value(), 5);
    }

    #[test]
    fn zero_practice_has_zero_mastery() {
        assert_eq!(derive_mastery(0, 0, false), MasteryLevel::ZERO);
    }

    #[test]
    fn attempts_recompute_from_updated_counts() {
        let mut record = ProgressRecord::first_attempt(
            UserId::random(),
            VocabularyId::random(),
            true,
            fixed_now(),
        );
        record.apply_attempt(true, fixed_now());
        assert_eq!(record.mastery_level().value(), 5);
        record.apply_attempt(false, fixed_now());
        record.apply_attempt(true, fixed_now());
        assert_eq!(record.times_practiced(), 4);
        assert_eq!(record.times_correct(), 3);
        assert_eq!(record.mastery_level().value(), 3);
    }

    #[test]
    fn correct_never_exceeds_practiced_over_mixed_sequences() {
        let pattern = [true, false, false, true, true, true, false, true, false, false];
        let mut record = ProgressRecord::first_attempt(
            UserId::random(),
            VocabularyId::random(),
            pattern[0],
            fixed_now(),
        );
        assert!(record.times_correct() <= record.times_practiced());

        for (i, was_correct) in pattern.iter().copied().cycle().skip(1).take(40).enumerate() {
            record.apply_attempt(was_correct, fixed_now());
            assert!(record.times_correct() <= record.times_practiced(), "step {i}");
            assert_eq!(
                record.mastery_level(),
                derive_mastery(record.times_correct(), record.times_practiced(), false)
            );
        }
    }

    #[test]
    fn persisted_counters_are_checked() {
        let err = ProgressRecord::from_persisted(
            UserId::random(),
            VocabularyId::random(),
            2,
            3,
            MasteryLevel::ZERO,
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ProgressRecordError::CorrectExceedsPracticed { correct: 3, practiced: 2 }
        ));
    }

    #[test]
    fn mastery_above_five_is_rejected() {
        assert_eq!(
            MasteryLevel::new(6).unwrap_err(),
            ProgressRecordError::MasteryOutOfRange(6)
        );
    }

    #[test]
    fn overall_progress_empty_is_zero() {
        let overall = OverallProgress::from_records(std::iter::empty());
        assert_eq!(overall, OverallProgress::default());
    }

    #[test]
    fn overall_progress_counts_level_four_and_up() {
        let mut records = Vec::new();
        for mastery in [4, 5, 4, 5] {
            records.push(record_with(10, 9, mastery));
        }
        for mastery in [0, 1, 2, 3, 3, 0] {
            records.push(record_with(10, 2, mastery));
        }

        let overall = OverallProgress::from_records(&records);
        assert_eq!(
            overall,
            OverallProgress {
                total_words: 10,
                mastered_words: 4,
                percentage: 40,
            }
        );
    }

    #[test]
    fn overall_progress_rounds_half_up() {
        let records = vec![record_with(1, 1, 5), record_with(1, 0, 0), record_with(1, 0, 0)];
        // 1/3 -> 33.3 -> 33
        assert_eq!(OverallProgress::from_records(&records).percentage, 33);

        let records = vec![record_with(1, 1, 5), record_with(1, 1, 4), record_with(1, 0, 0)];
        // 2/3 -> 66.7 -> 67
        assert_eq!(OverallProgress::from_records(&records).percentage, 67);

        let mut records: Vec<_> = (0..8).map(|_| record_with(1, 0, 0)).collect();
        records[0] = record_with(1, 1, 5);
        // 1/8 -> 12.5 -> 13
        assert_eq!(OverallProgress::from_records(&records).percentage, 13);
    }
}
