use std::sync::Arc;

use chrono::{DateTime, Utc};
use lingo_core::model::{FavoriteMark, FavoriteToggle, UserId, VocabularyEntry, VocabularyId};
use storage::repository::{FavoriteRepository, VocabularyRepository};
use tracing::warn;

use crate::Clock;
use crate::error::CatalogError;
use crate::identity::Identity;

/// A starred word joined with its catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteEntry {
    pub entry: VocabularyEntry,
    pub favorited_at: DateTime<Utc>,
}

/// Per-user starred words.
#[derive(Clone)]
pub struct FavoritesService {
    clock: Clock,
    identity: Arc<dyn Identity>,
    vocabulary: Arc<dyn VocabularyRepository>,
    favorites: Arc<dyn FavoriteRepository>,
}

impl FavoritesService {
    #[must_use]
    pub fn new(
        clock: Clock,
        identity: Arc<dyn Identity>,
        vocabulary: Arc<dyn VocabularyRepository>,
        favorites: Arc<dyn FavoriteRepository>,
    ) -> Self {
        Self {
            clock,
            identity,
            vocabulary,
            favorites,
        }
    }

    fn user(&self) -> Result<UserId, CatalogError> {
        self.identity
            .current_user()
            .ok_or(CatalogError::NotAuthenticated)
    }

    /// Star the word if it is not starred yet, otherwise unstar it.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotAuthenticated`, `CatalogError::UnknownWord`
    /// when adding a word missing from the catalog, or `CatalogError::Storage`.
    pub async fn toggle(
        &self,
        vocabulary_id: VocabularyId,
    ) -> Result<FavoriteToggle, CatalogError> {
        let user_id = self.user()?;

        if self
            .favorites
            .find_favorite(user_id, vocabulary_id)
            .await?
            .is_some()
        {
            self.favorites.delete_favorite(user_id, vocabulary_id).await?;
            return Ok(FavoriteToggle::Removed);
        }

        if self.vocabulary.get_entry(vocabulary_id).await?.is_none() {
            return Err(CatalogError::UnknownWord(vocabulary_id));
        }
        let mark = FavoriteMark::new(user_id, vocabulary_id, self.clock.now());
        self.favorites.insert_favorite(&mark).await?;
        Ok(FavoriteToggle::Added)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::NotAuthenticated` or `CatalogError::Storage`.
    pub async fn is_favorited(&self, vocabulary_id: VocabularyId) -> Result<bool, CatalogError> {
        let user_id = self.user()?;
        Ok(self
            .favorites
            .find_favorite(user_id, vocabulary_id)
            .await?
            .is_some())
    }

    /// Starred words, most recently starred first.
    ///
    /// Marks whose word has left the catalog are skipped.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotAuthenticated` or `CatalogError::Storage`.
    pub async fn list(&self) -> Result<Vec<FavoriteEntry>, CatalogError> {
        let user_id = self.user()?;
        let marks = self.favorites.list_favorites(user_id).await?;

        let mut out = Vec::with_capacity(marks.len());
        for mark in marks {
            match self.vocabulary.get_entry(mark.vocabulary_id).await? {
                Some(entry) => out.push(FavoriteEntry {
                    entry,
                    favorited_at: mark.created_at,
                }),
                None => warn!(
                    %user_id,
                    vocabulary_id = %mark.vocabulary_id,
                    "favorite points at a missing word"
                ),
            }
        }
        Ok(out)
    }
}
