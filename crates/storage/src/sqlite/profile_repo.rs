use lingo_core::model::{ProfileRecord, UserId};

use super::SqliteRepository;
use super::mapping::{conn, map_profile_row, u64_to_i64, write_err};
use crate::repository::{ProfileRepository, StorageError};

#[async_trait::async_trait]
impl ProfileRepository for SqliteRepository {
    async fn get_profile(&self, user_id: UserId) -> Result<Option<ProfileRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT
                user_id, username, total_xp, current_level, streak_days,
                last_activity_date, created_at, updated_at
            FROM profiles
            WHERE user_id = ?1
            ",
        )
        .bind(user_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_profile_row).transpose()
    }

    async fn insert_profile(&self, profile: &ProfileRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO profiles (
                user_id, username, total_xp, current_level, streak_days,
                last_activity_date, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(profile.user_id().value())
        .bind(profile.username())
        .bind(u64_to_i64("total_xp", profile.total_xp())?)
        .bind(i64::from(profile.current_level()))
        .bind(i64::from(profile.streak_days()))
        .bind(profile.last_activity_date())
        .bind(profile.created_at())
        .bind(profile.updated_at())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(())
    }

    async fn update_profile(&self, profile: &ProfileRecord) -> Result<(), StorageError> {
        // created_at is fixed at insert time
        let res = sqlx::query(
            r"
            UPDATE profiles SET
                username = ?2,
                total_xp = ?3,
                current_level = ?4,
                streak_days = ?5,
                last_activity_date = ?6,
                updated_at = ?7
            WHERE user_id = ?1
            ",
        )
        .bind(profile.user_id().value())
        .bind(profile.username())
        .bind(u64_to_i64("total_xp", profile.total_xp())?)
        .bind(i64::from(profile.current_level()))
        .bind(i64::from(profile.streak_days()))
        .bind(profile.last_activity_date())
        .bind(profile.updated_at())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
