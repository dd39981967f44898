use chrono::{DateTime, NaiveDate, Utc};
use lingo_core::Url;
use lingo_core::model::{
    Category, Difficulty, FavoriteMark, MasteryLevel, ProfileRecord, ProgressRecord, QuizResult,
    UserId, VocabularyEntry, VocabularyId,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use uuid::Uuid;

use crate::repository::{QuizResultRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Maps constraint violations to `Conflict`, everything else to `Connection`.
pub(crate) fn write_err(e: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StorageError::Conflict;
        }
    }
    conn(e)
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn u64_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn parse_url(field: &'static str, raw: Option<String>) -> Result<Option<Url>, StorageError> {
    raw.map(|s| {
        Url::parse(&s).map_err(|e| StorageError::Serialization(format!("invalid {field}: {e}")))
    })
    .transpose()
}

pub(crate) fn map_vocabulary_row(row: &SqliteRow) -> Result<VocabularyEntry, StorageError> {
    let id: Uuid = row.try_get("id").map_err(ser)?;
    let category: Category = row
        .try_get::<String, _>("category")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let difficulty: Difficulty = row
        .try_get::<String, _>("difficulty")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(ser)?;

    let entry = VocabularyEntry::new(
        VocabularyId::new(id),
        row.try_get::<String, _>("word").map_err(ser)?,
        row.try_get::<String, _>("translation").map_err(ser)?,
        category,
        difficulty,
        created_at,
    )
    .map_err(ser)?
    .with_pronunciation(row.try_get("pronunciation").map_err(ser)?)
    .with_example(
        row.try_get("example_sentence").map_err(ser)?,
        row.try_get("example_translation").map_err(ser)?,
    )
    .with_media(
        parse_url("audio_url", row.try_get("audio_url").map_err(ser)?)?,
        parse_url("image_url", row.try_get("image_url").map_err(ser)?)?,
    );

    Ok(entry)
}

pub(crate) fn map_progress_row(row: &SqliteRow) -> Result<ProgressRecord, StorageError> {
    let mastery_raw: i64 = row.try_get("mastery_level").map_err(ser)?;
    let mastery = u8::try_from(mastery_raw)
        .map_err(|_| StorageError::Serialization(format!("invalid mastery_level: {mastery_raw}")))
        .and_then(|v| MasteryLevel::new(v).map_err(ser))?;

    ProgressRecord::from_persisted(
        UserId::new(row.try_get("user_id").map_err(ser)?),
        VocabularyId::new(row.try_get("vocabulary_id").map_err(ser)?),
        u32_from_i64(
            "times_practiced",
            row.try_get::<i64, _>("times_practiced").map_err(ser)?,
        )?,
        u32_from_i64(
            "times_correct",
            row.try_get::<i64, _>("times_correct").map_err(ser)?,
        )?,
        mastery,
        row.try_get("last_practiced_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_profile_row(row: &SqliteRow) -> Result<ProfileRecord, StorageError> {
    let total_xp_raw: i64 = row.try_get("total_xp").map_err(ser)?;
    let total_xp = u64::try_from(total_xp_raw)
        .map_err(|_| StorageError::Serialization(format!("invalid total_xp: {total_xp_raw}")))?;
    let last_activity_date: Option<NaiveDate> = row.try_get("last_activity_date").map_err(ser)?;

    ProfileRecord::from_persisted(
        UserId::new(row.try_get("user_id").map_err(ser)?),
        row.try_get("username").map_err(ser)?,
        total_xp,
        u32_from_i64(
            "current_level",
            row.try_get::<i64, _>("current_level").map_err(ser)?,
        )?,
        u32_from_i64(
            "streak_days",
            row.try_get::<i64, _>("streak_days").map_err(ser)?,
        )?,
        last_activity_date,
        row.try_get("created_at").map_err(ser)?,
        row.try_get("updated_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_favorite_row(row: &SqliteRow) -> Result<FavoriteMark, StorageError> {
    Ok(FavoriteMark::new(
        UserId::new(row.try_get("user_id").map_err(ser)?),
        VocabularyId::new(row.try_get("vocabulary_id").map_err(ser)?),
        row.try_get("created_at").map_err(ser)?,
    ))
}

pub(crate) fn map_quiz_result_row(row: &SqliteRow) -> Result<QuizResultRow, StorageError> {
    let category = row
        .try_get::<Option<String>, _>("category")
        .map_err(ser)?
        .map(|raw| raw.parse::<Category>())
        .transpose()
        .map_err(ser)?;
    let xp_raw: i64 = row.try_get("xp_earned").map_err(ser)?;
    let xp_earned = u64::try_from(xp_raw)
        .map_err(|_| StorageError::Serialization(format!("invalid xp_earned: {xp_raw}")))?;

    let result = QuizResult::new(
        UserId::new(row.try_get("user_id").map_err(ser)?),
        category,
        u32_from_i64(
            "correct_answers",
            row.try_get::<i64, _>("correct_answers").map_err(ser)?,
        )?,
        u32_from_i64(
            "total_questions",
            row.try_get::<i64, _>("total_questions").map_err(ser)?,
        )?,
        xp_earned,
        row.try_get("completed_at").map_err(ser)?,
    )
    .map_err(ser)?;

    Ok(QuizResultRow::new(row.try_get("id").map_err(ser)?, result))
}
