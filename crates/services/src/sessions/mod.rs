mod flashcard;
mod options;
mod quiz;
mod reveal;

// Public API of the practice session subsystem.
pub use crate::error::SessionError;
pub use flashcard::{
    Flashcard, FlashcardService, FlashcardSession, JudgmentOutcome, build_cards, judge,
};
pub use options::{OPTION_COUNT, build_options};
pub use quiz::{
    QuizOutcome, QuizQuestion, QuizService, QuizSession, QuizState, QuizStep, QuizSubmission,
};
pub use reveal::{AdvanceCanceller, PendingAdvance, pending_advance};
