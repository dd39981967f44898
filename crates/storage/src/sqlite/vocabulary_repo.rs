use lingo_core::model::{VocabularyEntry, VocabularyFilter, VocabularyId};

use super::SqliteRepository;
use super::mapping::{conn, map_vocabulary_row, write_err};
use crate::repository::{StorageError, VocabularyRepository};

const SELECT_COLUMNS: &str = r"
    SELECT
        id, word, translation, category, difficulty, pronunciation,
        example_sentence, example_translation, audio_url, image_url, created_at
    FROM vocabulary
";

#[async_trait::async_trait]
impl VocabularyRepository for SqliteRepository {
    async fn upsert_entry(&self, entry: &VocabularyEntry) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO vocabulary (
                id, word, translation, category, difficulty, pronunciation,
                example_sentence, example_translation, audio_url, image_url, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(id) DO UPDATE SET
                word = excluded.word,
                translation = excluded.translation,
                category = excluded.category,
                difficulty = excluded.difficulty,
                pronunciation = excluded.pronunciation,
                example_sentence = excluded.example_sentence,
                example_translation = excluded.example_translation,
                audio_url = excluded.audio_url,
                image_url = excluded.image_url
            ",
        )
        .bind(entry.id().value())
        .bind(entry.word())
        .bind(entry.translation())
        .bind(entry.category().as_str())
        .bind(entry.difficulty().as_str())
        .bind(entry.pronunciation())
        .bind(entry.example_sentence())
        .bind(entry.example_translation())
        .bind(entry.audio_url().map(ToString::to_string))
        .bind(entry.image_url().map(ToString::to_string))
        .bind(entry.created_at())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(())
    }

    async fn get_entry(&self, id: VocabularyId) -> Result<Option<VocabularyEntry>, StorageError> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_vocabulary_row).transpose()
    }

    async fn list_entries(
        &self,
        filter: &VocabularyFilter,
    ) -> Result<Vec<VocabularyEntry>, StorageError> {
        let mut sql = format!("{SELECT_COLUMNS} WHERE 1 = 1");
        let mut bind_index = 1;

        if filter.category.is_some() {
            sql.push_str(&format!(" AND category = ?{bind_index}"));
            bind_index += 1;
        }
        if filter.difficulty.is_some() {
            sql.push_str(&format!(" AND difficulty = ?{bind_index}"));
            bind_index += 1;
        }
        sql.push_str(" ORDER BY created_at DESC, id ASC");

        // SQLite's lower() only folds ASCII, so text search is applied to the
        // decoded rows and the limit has to follow it.
        let searching = filter.search_needle().is_some();
        if filter.limit.is_some() && !searching {
            sql.push_str(&format!(" LIMIT ?{bind_index}"));
        }

        let mut query = sqlx::query(&sql);
        if let Some(category) = filter.category {
            query = query.bind(category.as_str());
        }
        if let Some(difficulty) = filter.difficulty {
            query = query.bind(difficulty.as_str());
        }
        if let (Some(limit), false) = (filter.limit, searching) {
            query = query.bind(i64::from(limit));
        }

        let rows = query.fetch_all(&self.pool).await.map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let entry = map_vocabulary_row(&row)?;
            if !searching || filter.matches(&entry) {
                out.push(entry);
            }
        }
        if let Some(limit) = filter.limit {
            out.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        Ok(out)
    }
}
