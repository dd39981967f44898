#![forbid(unsafe_code)]

pub mod account_service;
pub mod app_services;
pub mod catalog_service;
pub mod error;
pub mod favorites_service;
pub mod identity;
pub mod profile_ledger;
pub mod progress_tracker;
pub mod sessions;

pub use lingo_core::Clock;
pub use sessions as session;

pub use account_service::AccountService;
pub use app_services::AppServices;
pub use catalog_service::CatalogService;
pub use error::{
    AccountError, AppServicesError, CatalogError, LedgerError, ProgressError, SessionError,
};
pub use favorites_service::{FavoriteEntry, FavoritesService};
pub use identity::{Identity, LocalIdentity};
pub use profile_ledger::{ProfileLedger, StreakBaseline};
pub use progress_tracker::ProgressTracker;

pub use sessions::{
    AdvanceCanceller, Flashcard, FlashcardService, FlashcardSession, JudgmentOutcome,
    PendingAdvance, QuizOutcome, QuizQuestion, QuizService, QuizSession, QuizState, QuizStep,
    QuizSubmission,
};
