use async_trait::async_trait;
use lingo_core::model::{
    FavoriteMark, ProfileRecord, ProgressRecord, QuizResult, UserId, VocabularyEntry,
    VocabularyFilter, VocabularyId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Quiz result together with its storage row id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResultRow {
    pub id: i64,
    pub result: QuizResult,
}

impl QuizResultRow {
    #[must_use]
    pub fn new(id: i64, result: QuizResult) -> Self {
        Self { id, result }
    }
}

//
// ─── REPOSITORY CONTRACTS ──────────────────────────────────────────────────────
//

/// Read-mostly catalog of words.
#[async_trait]
pub trait VocabularyRepository: Send + Sync {
    /// Persist or replace an entry.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the entry cannot be stored.
    async fn upsert_entry(&self, entry: &VocabularyEntry) -> Result<(), StorageError>;

    /// Fetch one entry by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_entry(&self, id: VocabularyId) -> Result<Option<VocabularyEntry>, StorageError>;

    /// Entries matching `filter`, newest `created_at` first, capped by `filter.limit`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_entries(
        &self,
        filter: &VocabularyFilter,
    ) -> Result<Vec<VocabularyEntry>, StorageError>;
}

#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_progress(
        &self,
        user_id: UserId,
        vocabulary_id: VocabularyId,
    ) -> Result<Option<ProgressRecord>, StorageError>;

    /// Insert a new (user, word) record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if one already exists.
    async fn insert_progress(&self, record: &ProgressRecord) -> Result<(), StorageError>;

    /// Overwrite an existing (user, word) record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no record exists.
    async fn update_progress(&self, record: &ProgressRecord) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_progress(&self, user_id: UserId) -> Result<Vec<ProgressRecord>, StorageError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_profile(&self, user_id: UserId) -> Result<Option<ProfileRecord>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the user already has a profile.
    async fn insert_profile(&self, profile: &ProfileRecord) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user has no profile.
    async fn update_profile(&self, profile: &ProfileRecord) -> Result<(), StorageError>;
}

#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn find_favorite(
        &self,
        user_id: UserId,
        vocabulary_id: VocabularyId,
    ) -> Result<Option<FavoriteMark>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the pair is already marked.
    async fn insert_favorite(&self, mark: &FavoriteMark) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the pair was not marked.
    async fn delete_favorite(
        &self,
        user_id: UserId,
        vocabulary_id: VocabularyId,
    ) -> Result<(), StorageError>;

    /// Marks for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<FavoriteMark>, StorageError>;
}

#[async_trait]
pub trait QuizResultRepository: Send + Sync {
    /// Append a result and return its row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be written.
    async fn append_result(&self, result: &QuizResult) -> Result<i64, StorageError>;

    /// Most recent results for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_results(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<QuizResultRow>, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    vocabulary: Arc<Mutex<HashMap<VocabularyId, VocabularyEntry>>>,
    progress: Arc<Mutex<HashMap<(UserId, VocabularyId), ProgressRecord>>>,
    profiles: Arc<Mutex<HashMap<UserId, ProfileRecord>>>,
    favorites: Arc<Mutex<HashMap<(UserId, VocabularyId), FavoriteMark>>>,
    quiz_results: Arc<Mutex<Vec<QuizResultRow>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl VocabularyRepository for InMemoryRepository {
    async fn upsert_entry(&self, entry: &VocabularyEntry) -> Result<(), StorageError> {
        let mut guard = self.vocabulary.lock().map_err(poisoned)?;
        guard.insert(entry.id(), entry.clone());
        Ok(())
    }

    async fn get_entry(&self, id: VocabularyId) -> Result<Option<VocabularyEntry>, StorageError> {
        let guard = self.vocabulary.lock().map_err(poisoned)?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_entries(
        &self,
        filter: &VocabularyFilter,
    ) -> Result<Vec<VocabularyEntry>, StorageError> {
        let guard = self.vocabulary.lock().map_err(poisoned)?;
        let mut out: Vec<VocabularyEntry> = guard
            .values()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| a.id().cmp(&b.id()))
        });
        if let Some(limit) = filter.limit {
            out.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        Ok(out)
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn get_progress(
        &self,
        user_id: UserId,
        vocabulary_id: VocabularyId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let guard = self.progress.lock().map_err(poisoned)?;
        Ok(guard.get(&(user_id, vocabulary_id)).cloned())
    }

    async fn insert_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        let mut guard = self.progress.lock().map_err(poisoned)?;
        let key = (record.user_id(), record.vocabulary_id());
        if guard.contains_key(&key) {
            return Err(StorageError::Conflict);
        }
        guard.insert(key, record.clone());
        Ok(())
    }

    async fn update_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        let mut guard = self.progress.lock().map_err(poisoned)?;
        match guard.get_mut(&(record.user_id(), record.vocabulary_id())) {
            Some(slot) => {
                *slot = record.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound),
        }
    }

    async fn list_progress(&self, user_id: UserId) -> Result<Vec<ProgressRecord>, StorageError> {
        let guard = self.progress.lock().map_err(poisoned)?;
        let mut out: Vec<ProgressRecord> = guard
            .values()
            .filter(|r| r.user_id() == user_id)
            .cloned()
            .collect();
        out.sort_by_key(ProgressRecord::vocabulary_id);
        Ok(out)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn get_profile(&self, user_id: UserId) -> Result<Option<ProfileRecord>, StorageError> {
        let guard = self.profiles.lock().map_err(poisoned)?;
        Ok(guard.get(&user_id).cloned())
    }

    async fn insert_profile(&self, profile: &ProfileRecord) -> Result<(), StorageError> {
        let mut guard = self.profiles.lock().map_err(poisoned)?;
        if guard.contains_key(&profile.user_id()) {
            return Err(StorageError::Conflict);
        }
        guard.insert(profile.user_id(), profile.clone());
        Ok(())
    }

    async fn update_profile(&self, profile: &ProfileRecord) -> Result<(), StorageError> {
        let mut guard = self.profiles.lock().map_err(poisoned)?;
        match guard.get_mut(&profile.user_id()) {
            Some(slot) => {
                *slot = profile.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound),
        }
    }
}

#[async_trait]
impl FavoriteRepository for InMemoryRepository {
    async fn find_favorite(
        &self,
        user_id: UserId,
        vocabulary_id: VocabularyId,
    ) -> Result<Option<FavoriteMark>, StorageError> {
        let guard = self.favorites.lock().map_err(poisoned)?;
        Ok(guard.get(&(user_id, vocabulary_id)).cloned())
    }

    async fn insert_favorite(&self, mark: &FavoriteMark) -> Result<(), StorageError> {
        let mut guard = self.favorites.lock().map_err(poisoned)?;
        let key = (mark.user_id, mark.vocabulary_id);
        if guard.contains_key(&key) {
            return Err(StorageError::Conflict);
        }
        guard.insert(key, mark.clone());
        Ok(())
    }

    async fn delete_favorite(
        &self,
        user_id: UserId,
        vocabulary_id: VocabularyId,
    ) -> Result<(), StorageError> {
        let mut guard = self.favorites.lock().map_err(poisoned)?;
        guard
            .remove(&(user_id, vocabulary_id))
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }

    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<FavoriteMark>, StorageError> {
        let guard = self.favorites.lock().map_err(poisoned)?;
        let mut out: Vec<FavoriteMark> = guard
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.vocabulary_id.cmp(&b.vocabulary_id))
        });
        Ok(out)
    }
}

#[async_trait]
impl QuizResultRepository for InMemoryRepository {
    async fn append_result(&self, result: &QuizResult) -> Result<i64, StorageError> {
        let mut guard = self.quiz_results.lock().map_err(poisoned)?;
        let id = i64::try_from(guard.len())
            .map_err(|_| StorageError::Serialization("quiz result id overflow".into()))?
            + 1;
        guard.push(QuizResultRow::new(id, result.clone()));
        Ok(id)
    }

    async fn list_results(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<QuizResultRow>, StorageError> {
        let guard = self.quiz_results.lock().map_err(poisoned)?;
        let mut out: Vec<QuizResultRow> = guard
            .iter()
            .filter(|row| row.result.user_id() == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            b.result
                .completed_at()
                .cmp(&a.result.completed_at())
                .then_with(|| b.id.cmp(&a.id))
        });
        out.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(out)
    }
}

/// Aggregates all repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub vocabulary: Arc<dyn VocabularyRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub favorites: Arc<dyn FavoriteRepository>,
    pub quiz_results: Arc<dyn QuizResultRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    /// Share one backend across every repository slot.
    #[must_use]
    pub fn from_repository<R>(repo: R) -> Self
    where
        R: VocabularyRepository
            + ProgressRepository
            + ProfileRepository
            + FavoriteRepository
            + QuizResultRepository
            + Clone
            + 'static,
    {
        let vocabulary: Arc<dyn VocabularyRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let profiles: Arc<dyn ProfileRepository> = Arc::new(repo.clone());
        let favorites: Arc<dyn FavoriteRepository> = Arc::new(repo.clone());
        let quiz_results: Arc<dyn QuizResultRepository> = Arc::new(repo);
        Self {
            vocabulary,
            progress,
            profiles,
            favorites,
            quiz_results,
        }
    }
}
