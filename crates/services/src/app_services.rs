use std::sync::Arc;

use lingo_core::model::PracticeSettings;
use storage::repository::Storage;

use crate::Clock;
use crate::account_service::AccountService;
use crate::catalog_service::CatalogService;
use crate::error::AppServicesError;
use crate::favorites_service::FavoritesService;
use crate::identity::{Identity, LocalIdentity};
use crate::profile_ledger::ProfileLedger;
use crate::progress_tracker::ProgressTracker;
use crate::sessions::{FlashcardService, QuizService};

/// Assembles app-facing services around one storage backend and one identity.
#[derive(Clone)]
pub struct AppServices {
    settings: PracticeSettings,
    accounts: Arc<AccountService>,
    catalog: Arc<CatalogService>,
    favorites: Arc<FavoritesService>,
    progress: Arc<ProgressTracker>,
    ledger: Arc<ProfileLedger>,
    quiz: Arc<QuizService>,
    flashcards: Arc<FlashcardService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        settings: PracticeSettings,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(&storage, clock, settings))
    }

    #[must_use]
    pub fn in_memory(clock: Clock, settings: PracticeSettings) -> Self {
        Self::new(&Storage::in_memory(), clock, settings)
    }

    #[must_use]
    pub fn new(storage: &Storage, clock: Clock, settings: PracticeSettings) -> Self {
        let local = Arc::new(LocalIdentity::new());
        let identity: Arc<dyn Identity> = local.clone();

        let accounts = AccountService::new(clock, local, Arc::clone(&storage.profiles));
        let catalog = CatalogService::new(Arc::clone(&storage.vocabulary));
        let favorites = FavoritesService::new(
            clock,
            Arc::clone(&identity),
            Arc::clone(&storage.vocabulary),
            Arc::clone(&storage.favorites),
        );
        let progress =
            ProgressTracker::new(clock, Arc::clone(&identity), Arc::clone(&storage.progress));
        let ledger =
            ProfileLedger::new(clock, Arc::clone(&identity), Arc::clone(&storage.profiles));
        let quiz = QuizService::new(
            clock,
            settings.clone(),
            identity,
            catalog.clone(),
            progress.clone(),
            ledger.clone(),
            Arc::clone(&storage.quiz_results),
        );
        let flashcards = FlashcardService::new(
            clock,
            settings.clone(),
            catalog.clone(),
            progress.clone(),
            ledger.clone(),
        );

        Self {
            settings,
            accounts: Arc::new(accounts),
            catalog: Arc::new(catalog),
            favorites: Arc::new(favorites),
            progress: Arc::new(progress),
            ledger: Arc::new(ledger),
            quiz: Arc::new(quiz),
            flashcards: Arc::new(flashcards),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &PracticeSettings {
        &self.settings
    }

    #[must_use]
    pub fn accounts(&self) -> Arc<AccountService> {
        Arc::clone(&self.accounts)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn favorites(&self) -> Arc<FavoritesService> {
        Arc::clone(&self.favorites)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressTracker> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn ledger(&self) -> Arc<ProfileLedger> {
        Arc::clone(&self.ledger)
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn flashcards(&self) -> Arc<FlashcardService> {
        Arc::clone(&self.flashcards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use lingo_core::time::fixed_clock;

    #[tokio::test]
    async fn sign_up_is_visible_to_every_service() {
        let services = AppServices::in_memory(fixed_clock(), PracticeSettings::default());
        let profile = services.accounts().sign_up(None).await.unwrap();

        let viewed = services.ledger().profile().await.unwrap();
        assert_eq!(viewed.user_id(), profile.user_id());
        assert!(services.progress().list().await.unwrap().is_empty());
        assert!(services.favorites().list().await.unwrap().is_empty());

        services.accounts().sign_out();
        assert!(services.ledger().profile().await.is_err());
    }
}
