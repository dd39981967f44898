mod favorite;
mod ids;
mod profile;
mod progress;
mod quiz;
mod settings;
mod vocabulary;

pub use ids::{ParseIdError, UserId, VocabularyId};

pub use favorite::{FavoriteMark, FavoriteToggle};
pub use profile::{ProfileError, ProfileRecord, StreakTransition, XP_PER_LEVEL, level_for_xp};
pub use progress::{
    MASTERED_THRESHOLD, MAX_MASTERY, MasteryLevel, OverallProgress, ProgressRecord,
    ProgressRecordError, derive_mastery,
};
pub use quiz::{QuizResult, QuizResultError};
pub use settings::{MAX_REVEAL_DELAY, PracticeSettings, SettingsError};
pub use vocabulary::{Category, Difficulty, VocabularyEntry, VocabularyError, VocabularyFilter};
