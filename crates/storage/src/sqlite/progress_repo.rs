use lingo_core::model::{ProgressRecord, UserId, VocabularyId};

use super::SqliteRepository;
use super::mapping::{conn, map_progress_row, write_err};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn get_progress(
        &self,
        user_id: UserId,
        vocabulary_id: VocabularyId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT
                user_id, vocabulary_id, times_practiced, times_correct,
                mastery_level, last_practiced_at
            FROM user_progress
            WHERE user_id = ?1 AND vocabulary_id = ?2
            ",
        )
        .bind(user_id.value())
        .bind(vocabulary_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_progress_row).transpose()
    }

    async fn insert_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO user_progress (
                user_id, vocabulary_id, times_practiced, times_correct,
                mastery_level, last_practiced_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(record.user_id().value())
        .bind(record.vocabulary_id().value())
        .bind(i64::from(record.times_practiced()))
        .bind(i64::from(record.times_correct()))
        .bind(i64::from(record.mastery_level().value()))
        .bind(record.last_practiced_at())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(())
    }

    async fn update_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE user_progress SET
                times_practiced = ?3,
                times_correct = ?4,
                mastery_level = ?5,
                last_practiced_at = ?6
            WHERE user_id = ?1 AND vocabulary_id = ?2
            ",
        )
        .bind(record.user_id().value())
        .bind(record.vocabulary_id().value())
        .bind(i64::from(record.times_practiced()))
        .bind(i64::from(record.times_correct()))
        .bind(i64::from(record.mastery_level().value()))
        .bind(record.last_practiced_at())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn list_progress(&self, user_id: UserId) -> Result<Vec<ProgressRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT
                user_id, vocabulary_id, times_practiced, times_correct,
                mastery_level, last_practiced_at
            FROM user_progress
            WHERE user_id = ?1
            ORDER BY vocabulary_id ASC
            ",
        )
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_progress_row(&row)?);
        }
        Ok(out)
    }
}
