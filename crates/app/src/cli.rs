use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use lingo_core::model::{
    Category, Difficulty, PracticeSettings, SettingsError, UserId, VocabularyFilter, VocabularyId,
};

pub const DEFAULT_DB_URL: &str = "sqlite://lingo.sqlite3";

#[derive(Debug, Parser)]
#[command(name = "lingo")]
#[command(about = "Vocabulary quizzes and flashcards", long_about = None)]
pub struct Cli {
    /// SQLite URL or file path.
    #[arg(long = "db", env = "LINGO_DB_URL", default_value = DEFAULT_DB_URL, global = true)]
    pub db_url: String,

    /// Account to act as. Create one with `signup`.
    #[arg(long = "user", env = "LINGO_USER_ID", global = true)]
    pub user: Option<UserId>,

    /// Fixed shuffle seed for reproducible sessions.
    #[arg(long, global = true)]
    pub shuffle_seed: Option<u64>,

    #[command(flatten)]
    pub practice: PracticeArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct PracticeArgs {
    #[arg(
        long,
        env = "LINGO_QUIZ_LENGTH",
        default_value_t = PracticeSettings::default().quiz_length(),
        global = true
    )]
    pub quiz_length: u32,

    #[arg(
        long,
        env = "LINGO_FLASHCARD_LENGTH",
        default_value_t = PracticeSettings::default().flashcard_length(),
        global = true
    )]
    pub flashcard_length: u32,

    #[arg(
        long,
        env = "LINGO_QUIZ_XP",
        default_value_t = PracticeSettings::default().quiz_xp_per_correct(),
        global = true
    )]
    pub quiz_xp: u32,

    #[arg(
        long,
        env = "LINGO_FLASHCARD_XP",
        default_value_t = PracticeSettings::default().flashcard_xp_per_correct(),
        global = true
    )]
    pub flashcard_xp: u32,

    /// Pause after revealing a quiz answer, in milliseconds.
    #[arg(long, env = "LINGO_REVEAL_MS", default_value_t = 1500, global = true)]
    pub reveal_ms: u64,
}

impl PracticeArgs {
    /// # Errors
    ///
    /// Returns `SettingsError` when a knob is out of range.
    pub fn settings(&self) -> Result<PracticeSettings, SettingsError> {
        PracticeSettings::new(
            self.quiz_length,
            self.flashcard_length,
            self.quiz_xp,
            self.flashcard_xp,
            Duration::from_millis(self.reveal_ms),
        )
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the starter vocabulary catalog.
    Seed,
    /// Create an account and sign in as it.
    Signup {
        #[arg(long)]
        name: Option<String>,
    },
    /// Multiple-choice translation quiz.
    Quiz {
        #[arg(long)]
        category: Option<Category>,
    },
    /// True/false flashcards.
    Flashcards {
        #[arg(long)]
        category: Option<Category>,
    },
    /// Level, XP, streak and mastery overview.
    Profile {
        #[arg(long)]
        json: bool,
    },
    /// Change the display name.
    Rename { name: String },
    /// Browse the catalog.
    Words(WordsArgs),
    /// Star or unstar a word.
    Favorite { id: VocabularyId },
    /// Starred words, newest first.
    Favorites,
    /// Latest quiz results.
    History {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
}

#[derive(Debug, Args)]
pub struct WordsArgs {
    #[arg(long)]
    pub category: Option<Category>,
    #[arg(long)]
    pub difficulty: Option<Difficulty>,
    /// Substring of the word or its translation.
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub limit: Option<u32>,
}

impl WordsArgs {
    #[must_use]
    pub fn filter(&self) -> VocabularyFilter {
        VocabularyFilter::all()
            .with_category(self.category)
            .with_difficulty(self.difficulty)
            .with_search(self.search.clone())
            .with_limit(self.limit)
    }
}
