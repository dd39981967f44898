use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;

use lingo_core::model::{Category, VocabularyEntry, VocabularyFilter, VocabularyId};
use storage::repository::VocabularyRepository;

use crate::error::CatalogError;

/// Read-only lookups over the vocabulary catalog.
#[derive(Clone)]
pub struct CatalogService {
    vocabulary: Arc<dyn VocabularyRepository>,
}

impl CatalogService {
    #[must_use]
    pub fn new(vocabulary: Arc<dyn VocabularyRepository>) -> Self {
        Self { vocabulary }
    }

    /// List entries matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn list(
        &self,
        filter: &VocabularyFilter,
    ) -> Result<Vec<VocabularyEntry>, CatalogError> {
        Ok(self.vocabulary.list_entries(filter).await?)
    }

    /// Fetch a single entry; `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn get(&self, id: VocabularyId) -> Result<Option<VocabularyEntry>, CatalogError> {
        Ok(self.vocabulary.get_entry(id).await?)
    }

    /// Draw up to `count` distinct entries uniformly at random.
    ///
    /// A population smaller than `count` is returned whole, in random order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn sample<R: Rng + ?Sized>(
        &self,
        category: Option<Category>,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<VocabularyEntry>, CatalogError> {
        let filter = VocabularyFilter::all().with_category(category);
        let mut population = self.vocabulary.list_entries(&filter).await?;
        population.shuffle(rng);
        population.truncate(count);
        Ok(population)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    use lingo_core::model::Difficulty;
    use lingo_core::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use storage::repository::InMemoryRepository;

    async fn seeded_catalog(food: u128, animals: u128) -> CatalogService {
        let repo = InMemoryRepository::new();
        for n in 0..food + animals {
            let category = if n < food { Category::Food } else { Category::Animals };
            let entry = VocabularyEntry::new(
                VocabularyId::from_u128(n + 1),
                format!("word{n}"),
                format!("translation{n}"),
                category,
                Difficulty::Beginner,
                fixed_now(),
            )
            .unwrap();
            repo.upsert_entry(&entry).await.unwrap();
        }
        CatalogService::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn sample_draws_without_replacement() {
        let catalog = seeded_catalog(12, 0).await;
        let mut rng = StdRng::seed_from_u64(7);

        let sample = catalog.sample(None, 10, &mut rng).await.unwrap();
        assert_eq!(sample.len(), 10);
        let ids: HashSet<_> = sample.iter().map(VocabularyEntry::id).collect();
        assert_eq!(ids.len(), 10);
    }

    #[tokio::test]
    async fn sample_returns_whole_small_population() {
        let catalog = seeded_catalog(3, 5).await;
        let mut rng = StdRng::seed_from_u64(1);

        let sample = catalog
            .sample(Some(Category::Food), 10, &mut rng)
            .await
            .unwrap();
        assert_eq!(sample.len(), 3);
        assert!(sample.iter().all(|e| e.category() == Category::Food));
    }

    #[tokio::test]
    async fn seeded_samples_are_reproducible() {
        let catalog = seeded_catalog(20, 0).await;

        let a = catalog
            .sample(None, 5, &mut StdRng::seed_from_u64(42))
            .await
            .unwrap();
        let b = catalog
            .sample(None, 5, &mut StdRng::seed_from_u64(42))
            .await
            .unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn get_missing_word_is_none() {
        let catalog = seeded_catalog(1, 0).await;
        assert!(
            catalog
                .get(VocabularyId::from_u128(999))
                .await
                .unwrap()
                .is_none()
        );
    }
}
