use std::fmt;

use clap::Parser;
use lingo_core::Clock;
use lingo_core::model::{FavoriteToggle, UserId};
use rand::SeedableRng;
use rand::rngs::StdRng;
use services::AppServices;
use storage::repository::Storage;
use tokio::io::BufReader;

mod cli;
mod practice;
mod seed;
mod telemetry;

use cli::{Cli, Command, WordsArgs};
use practice::Prompt;

#[derive(Debug)]
enum ArgsError {
    MissingUser,
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingUser => {
                write!(f, "no account selected: pass --user or set LINGO_USER_ID (see `signup`)")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim();
    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), ArgsError> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let invalid = || ArgsError::InvalidDbUrl {
        raw: db_url.to_string(),
    };
    let path = db_url.strip_prefix("sqlite://").ok_or_else(invalid)?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(invalid());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|_| invalid())?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|_| invalid())?;
    }

    Ok(())
}

type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

async fn sign_in(services: &AppServices, user: Option<UserId>) -> AppResult<()> {
    let user = user.ok_or(ArgsError::MissingUser)?;
    services.accounts().sign_in(user).await?;
    Ok(())
}

async fn show_profile(services: &AppServices, json: bool) -> AppResult<()> {
    let profile = services.ledger().profile().await?;
    let overall = services.progress().overall_progress().await?;

    if json {
        let view = serde_json::json!({
            "profile": profile,
            "level_progress": profile.level_progress(),
            "xp_to_next_level": profile.xp_to_next_level(),
            "progress": overall,
        });
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("{} ({})", profile.username().unwrap_or("learner"), profile.user_id());
    println!(
        "Level {}  {} xp total, {}/100 into this level, {} to the next",
        profile.current_level(),
        profile.total_xp(),
        profile.level_progress(),
        profile.xp_to_next_level()
    );
    match profile.last_activity_date() {
        Some(day) => println!("Streak {} day(s), last active {day}", profile.streak_days()),
        None => println!("No practice yet"),
    }
    println!(
        "Mastered {} of {} practiced words ({}%)",
        overall.mastered_words, overall.total_words, overall.percentage
    );
    Ok(())
}

async fn list_words(
    services: &AppServices,
    args: &WordsArgs,
    signed_in: bool,
) -> AppResult<()> {
    let entries = services.catalog().list(&args.filter()).await?;
    if entries.is_empty() {
        println!("No words found. Run `seed` to load the starter catalog.");
        return Ok(());
    }

    for entry in entries {
        let marks = if signed_in {
            let mastery = services.progress().mastery_level(entry.id()).await?;
            let star = if services.favorites().is_favorited(entry.id()).await? {
                "*"
            } else {
                " "
            };
            format!("{star} m{} ", mastery.value())
        } else {
            String::new()
        };
        println!(
            "{marks}{}  {:<16} {:<16} [{}, {}]",
            entry.id(),
            entry.word(),
            entry.translation(),
            entry.category().label(),
            entry.difficulty()
        );
    }
    Ok(())
}

async fn run() -> AppResult<()> {
    let Cli {
        db_url,
        user,
        shuffle_seed,
        practice,
        command,
    } = Cli::parse();
    telemetry::init_tracing();

    let settings = practice.settings()?;
    let db_url = normalize_sqlite_url(db_url);

    // Storage::sqlite runs pending migrations.
    prepare_sqlite_file(&db_url)?;
    let storage = Storage::sqlite(&db_url).await?;
    tracing::debug!(db = %db_url, "database ready");
    let clock = Clock::default_clock();
    let services = AppServices::new(&storage, clock, settings);

    let mut rng = match shuffle_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let mut prompt = Prompt::new(BufReader::new(tokio::io::stdin()), std::io::stdout());

    match command {
        Command::Seed => {
            let written = seed::seed_catalog(storage.vocabulary.as_ref(), &clock).await?;
            println!("Seeded {written} words into {db_url}");
        }
        Command::Signup { name } => {
            let profile = services.accounts().sign_up(name).await?;
            println!("Created account {}", profile.user_id());
            println!("export LINGO_USER_ID={}", profile.user_id());
        }
        Command::Words(args) => {
            let signed_in = match user {
                Some(_) => {
                    sign_in(&services, user).await?;
                    true
                }
                None => false,
            };
            list_words(&services, &args, signed_in).await?;
        }
        Command::Quiz { category } => {
            sign_in(&services, user).await?;
            practice::run_quiz(&services, category, &mut prompt, &mut rng).await?;
        }
        Command::Flashcards { category } => {
            sign_in(&services, user).await?;
            practice::run_flashcards(&services, category, &mut prompt, &mut rng).await?;
        }
        Command::Profile { json } => {
            sign_in(&services, user).await?;
            show_profile(&services, json).await?;
        }
        Command::Rename { name } => {
            sign_in(&services, user).await?;
            let profile = services.ledger().set_username(Some(name)).await?;
            println!("Now known as {}", profile.username().unwrap_or("learner"));
        }
        Command::Favorite { id } => {
            sign_in(&services, user).await?;
            match services.favorites().toggle(id).await? {
                FavoriteToggle::Added => println!("Starred {id}"),
                FavoriteToggle::Removed => println!("Unstarred {id}"),
            }
        }
        Command::Favorites => {
            sign_in(&services, user).await?;
            let favorites = services.favorites().list().await?;
            if favorites.is_empty() {
                println!("No starred words yet.");
            }
            for favorite in favorites {
                println!(
                    "{}  {} = {}  (starred {})",
                    favorite.entry.id(),
                    favorite.entry.word(),
                    favorite.entry.translation(),
                    favorite.favorited_at.format("%Y-%m-%d")
                );
            }
        }
        Command::History { limit } => {
            sign_in(&services, user).await?;
            let rows = services.quiz().recent_results(limit).await?;
            if rows.is_empty() {
                println!("No quizzes taken yet.");
            }
            for row in rows {
                let result = &row.result;
                println!(
                    "#{}  {}  {}/{} correct  +{} xp  {}",
                    row.id,
                    result.completed_at().format("%Y-%m-%d %H:%M"),
                    result.correct_answers(),
                    result.total_questions(),
                    result.xp_earned(),
                    result.category().map_or("mixed", |c| c.label())
                );
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
