use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::UserId;
use crate::model::vocabulary::Category;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizResultError {
    #[error("correct answers ({correct}) exceed total questions ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },

    #[error("a quiz must have at least one question")]
    NoQuestions,
}

/// Append-only summary row written once per completed quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    user_id: UserId,
    category: Option<Category>,
    correct_answers: u32,
    total_questions: u32,
    xp_earned: u64,
    completed_at: DateTime<Utc>,
}

impl QuizResult {
    /// # Errors
    ///
    /// Returns `QuizResultError` when the counts are inconsistent.
    pub fn new(
        user_id: UserId,
        category: Option<Category>,
        correct_answers: u32,
        total_questions: u32,
        xp_earned: u64,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, QuizResultError> {
        if total_questions == 0 {
            return Err(QuizResultError::NoQuestions);
        }
        if correct_answers > total_questions {
            return Err(QuizResultError::CorrectExceedsTotal {
                correct: correct_answers,
                total: total_questions,
            });
        }
        Ok(Self {
            user_id,
            category,
            correct_answers,
            total_questions,
            xp_earned,
            completed_at,
        })
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn category(&self) -> Option<Category> {
        self.category
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn xp_earned(&self) -> u64 {
        self.xp_earned
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn rejects_more_correct_than_total() {
        let err = QuizResult::new(UserId::random(), None, 11, 10, 165, fixed_now()).unwrap_err();
        assert_eq!(
            err,
            QuizResultError::CorrectExceedsTotal {
                correct: 11,
                total: 10
            }
        );
    }

    #[test]
    fn rejects_empty_quiz() {
        let err = QuizResult::new(UserId::random(), None, 0, 0, 0, fixed_now()).unwrap_err();
        assert_eq!(err, QuizResultError::NoQuestions);
    }

    #[test]
    fn keeps_category() {
        let r = QuizResult::new(
            UserId::random(),
            Some(Category::Food),
            7,
            10,
            105,
            fixed_now(),
        )
        .unwrap();
        assert_eq!(r.category(), Some(Category::Food));
        assert_eq!(r.xp_earned(), 105);
    }
}
