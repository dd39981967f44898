use lingo_core::model::{FavoriteMark, UserId, VocabularyId};

use super::SqliteRepository;
use super::mapping::{conn, map_favorite_row, write_err};
use crate::repository::{FavoriteRepository, StorageError};

#[async_trait::async_trait]
impl FavoriteRepository for SqliteRepository {
    async fn find_favorite(
        &self,
        user_id: UserId,
        vocabulary_id: VocabularyId,
    ) -> Result<Option<FavoriteMark>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT user_id, vocabulary_id, created_at
            FROM favorites
            WHERE user_id = ?1 AND vocabulary_id = ?2
            ",
        )
        .bind(user_id.value())
        .bind(vocabulary_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_favorite_row).transpose()
    }

    async fn insert_favorite(&self, mark: &FavoriteMark) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO favorites (user_id, vocabulary_id, created_at)
            VALUES (?1, ?2, ?3)
            ",
        )
        .bind(mark.user_id.value())
        .bind(mark.vocabulary_id.value())
        .bind(mark.created_at)
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(())
    }

    async fn delete_favorite(
        &self,
        user_id: UserId,
        vocabulary_id: VocabularyId,
    ) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM favorites WHERE user_id = ?1 AND vocabulary_id = ?2")
            .bind(user_id.value())
            .bind(vocabulary_id.value())
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<FavoriteMark>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT user_id, vocabulary_id, created_at
            FROM favorites
            WHERE user_id = ?1
            ORDER BY created_at DESC, vocabulary_id ASC
            ",
        )
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_favorite_row(&row)?);
        }
        Ok(out)
    }
}
