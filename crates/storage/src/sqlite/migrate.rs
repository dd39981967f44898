use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs the versioned migrations for the practice schema.
///
/// Version 1 creates vocabulary, per-user progress, profiles, favorites,
/// quiz results, and their indexes.
#[allow(clippy::too_many_lines)]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS vocabulary (
                    id BLOB PRIMARY KEY,
                    word TEXT NOT NULL,
                    translation TEXT NOT NULL,
                    category TEXT NOT NULL,
                    difficulty TEXT NOT NULL,
                    pronunciation TEXT,
                    example_sentence TEXT,
                    example_translation TEXT,
                    audio_url TEXT,
                    image_url TEXT,
                    created_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS user_progress (
                    user_id BLOB NOT NULL,
                    vocabulary_id BLOB NOT NULL,
                    times_practiced INTEGER NOT NULL CHECK (times_practiced >= 0),
                    times_correct INTEGER NOT NULL CHECK (times_correct >= 0),
                    mastery_level INTEGER NOT NULL CHECK (mastery_level BETWEEN 0 AND 5),
                    last_practiced_at TEXT,
                    PRIMARY KEY (user_id, vocabulary_id),
                    FOREIGN KEY (vocabulary_id) REFERENCES vocabulary(id) ON DELETE CASCADE,
                    CHECK (times_correct <= times_practiced)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS profiles (
                    user_id BLOB PRIMARY KEY,
                    username TEXT,
                    total_xp INTEGER NOT NULL CHECK (total_xp >= 0),
                    current_level INTEGER NOT NULL CHECK (current_level >= 1),
                    streak_days INTEGER NOT NULL CHECK (streak_days >= 0),
                    last_activity_date TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS favorites (
                    user_id BLOB NOT NULL,
                    vocabulary_id BLOB NOT NULL,
                    created_at TEXT NOT NULL,
                    PRIMARY KEY (user_id, vocabulary_id),
                    FOREIGN KEY (vocabulary_id) REFERENCES vocabulary(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS quiz_results (
                    id INTEGER PRIMARY KEY,
                    user_id BLOB NOT NULL,
                    category TEXT,
                    correct_answers INTEGER NOT NULL CHECK (correct_answers >= 0),
                    total_questions INTEGER NOT NULL CHECK (total_questions > 0),
                    xp_earned INTEGER NOT NULL CHECK (xp_earned >= 0),
                    completed_at TEXT NOT NULL,
                    CHECK (correct_answers <= total_questions)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_vocabulary_category_created
                    ON vocabulary (category, created_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_favorites_user_created
                    ON favorites (user_id, created_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_quiz_results_user_completed
                    ON quiz_results (user_id, completed_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
