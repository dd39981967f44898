use lingo_core::model::{QuizResult, UserId};

use super::SqliteRepository;
use super::mapping::{conn, map_quiz_result_row, u64_to_i64, write_err};
use crate::repository::{QuizResultRepository, QuizResultRow, StorageError};

#[async_trait::async_trait]
impl QuizResultRepository for SqliteRepository {
    async fn append_result(&self, result: &QuizResult) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO quiz_results (
                    user_id, category, correct_answers, total_questions,
                    xp_earned, completed_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(result.user_id().value())
        .bind(result.category().map(|c| c.as_str()))
        .bind(i64::from(result.correct_answers()))
        .bind(i64::from(result.total_questions()))
        .bind(u64_to_i64("xp_earned", result.xp_earned())?)
        .bind(result.completed_at())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(res.last_insert_rowid())
    }

    async fn list_results(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<QuizResultRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    id, user_id, category, correct_answers, total_questions,
                    xp_earned, completed_at
                FROM quiz_results
                WHERE user_id = ?1
                ORDER BY completed_at DESC, id DESC
                LIMIT ?2
            ",
        )
        .bind(user_id.value())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_quiz_result_row(&row)?);
        }
        Ok(out)
    }
}
