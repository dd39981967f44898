use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Longest reveal pause we accept before auto-advancing.
pub const MAX_REVEAL_DELAY: Duration = Duration::from_secs(60);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("quiz length must be > 0")]
    InvalidQuizLength,

    #[error("flashcard length must be > 0")]
    InvalidFlashcardLength,

    #[error("quiz xp per correct answer must be > 0")]
    InvalidQuizXp,

    #[error("flashcard xp per correct judgment must be > 0")]
    InvalidFlashcardXp,

    #[error("reveal delay must be at most 60 seconds")]
    InvalidRevealDelay,
}

/// Tunables for practice sessions and their XP awards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeSettings {
    quiz_length: u32,
    flashcard_length: u32,
    quiz_xp_per_correct: u32,
    flashcard_xp_per_correct: u32,
    reveal_delay: Duration,
}

impl Default for PracticeSettings {
    /// Ten questions or cards, 15 xp per quiz hit, 10 per flashcard hit,
    /// and a 1.5 s reveal before the next question.
    fn default() -> Self {
        Self {
            quiz_length: 10,
            flashcard_length: 10,
            quiz_xp_per_correct: 15,
            flashcard_xp_per_correct: 10,
            reveal_delay: Duration::from_millis(1500),
        }
    }
}

impl PracticeSettings {
    /// # Errors
    ///
    /// Returns `SettingsError` if a length or XP award is zero, or the reveal
    /// delay exceeds `MAX_REVEAL_DELAY`.
    pub fn new(
        quiz_length: u32,
        flashcard_length: u32,
        quiz_xp_per_correct: u32,
        flashcard_xp_per_correct: u32,
        reveal_delay: Duration,
    ) -> Result<Self, SettingsError> {
        if quiz_length == 0 {
            return Err(SettingsError::InvalidQuizLength);
        }
        if flashcard_length == 0 {
            return Err(SettingsError::InvalidFlashcardLength);
        }
        if quiz_xp_per_correct == 0 {
            return Err(SettingsError::InvalidQuizXp);
        }
        if flashcard_xp_per_correct == 0 {
            return Err(SettingsError::InvalidFlashcardXp);
        }
        if reveal_delay > MAX_REVEAL_DELAY {
            return Err(SettingsError::InvalidRevealDelay);
        }
        Ok(Self {
            quiz_length,
            flashcard_length,
            quiz_xp_per_correct,
            flashcard_xp_per_correct,
            reveal_delay,
        })
    }

    #[must_use]
    pub fn quiz_length(&self) -> u32 {
        self.quiz_length
    }

    #[must_use]
    pub fn flashcard_length(&self) -> u32 {
        self.flashcard_length
    }

    #[must_use]
    pub fn quiz_xp_per_correct(&self) -> u32 {
        self.quiz_xp_per_correct
    }

    #[must_use]
    pub fn flashcard_xp_per_correct(&self) -> u32 {
        self.flashcard_xp_per_correct
    }

    #[must_use]
    pub fn reveal_delay(&self) -> Duration {
        self.reveal_delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_practice_rules() {
        let s = PracticeSettings::default();
        assert_eq!(s.quiz_length(), 10);
        assert_eq!(s.flashcard_length(), 10);
        assert_eq!(s.quiz_xp_per_correct(), 15);
        assert_eq!(s.flashcard_xp_per_correct(), 10);
        assert_eq!(s.reveal_delay(), Duration::from_millis(1500));
    }

    #[test]
    fn zero_lengths_are_rejected() {
        assert_eq!(
            PracticeSettings::new(0, 10, 15, 10, Duration::ZERO),
            Err(SettingsError::InvalidQuizLength)
        );
        assert_eq!(
            PracticeSettings::new(10, 0, 15, 10, Duration::ZERO),
            Err(SettingsError::InvalidFlashcardLength)
        );
    }

    #[test]
    fn zero_xp_is_rejected() {
        assert_eq!(
            PracticeSettings::new(10, 10, 0, 10, Duration::ZERO),
            Err(SettingsError::InvalidQuizXp)
        );
        assert_eq!(
            PracticeSettings::new(10, 10, 15, 0, Duration::ZERO),
            Err(SettingsError::InvalidFlashcardXp)
        );
    }

    #[test]
    fn long_reveal_is_rejected() {
        assert_eq!(
            PracticeSettings::new(10, 10, 15, 10, Duration::from_secs(61)),
            Err(SettingsError::InvalidRevealDelay)
        );
        assert!(PracticeSettings::new(10, 10, 15, 10, MAX_REVEAL_DELAY).is_ok());
    }
}
