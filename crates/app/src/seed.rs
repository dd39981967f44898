use chrono::Duration;
use lingo_core::Clock;
use lingo_core::model::{Category, Difficulty, VocabularyEntry, VocabularyError, VocabularyId};
use storage::repository::{StorageError, VocabularyRepository};

use lingo_core::model::Category::{
    Animals, Business, Colors, Daily, Food, Greetings, Numbers, Travel,
};
use lingo_core::model::Difficulty::{Advanced, Beginner, Intermediate};

struct SeedWord {
    word: &'static str,
    translation: &'static str,
    category: Category,
    difficulty: Difficulty,
    pronunciation: Option<&'static str>,
    example: Option<(&'static str, &'static str)>,
}

const fn word(
    word: &'static str,
    translation: &'static str,
    category: Category,
    difficulty: Difficulty,
) -> SeedWord {
    SeedWord {
        word,
        translation,
        category,
        difficulty,
        pronunciation: None,
        example: None,
    }
}

const fn spoken(mut seed: SeedWord, pronunciation: &'static str) -> SeedWord {
    seed.pronunciation = Some(pronunciation);
    seed
}

const fn example(
    mut seed: SeedWord,
    sentence: &'static str,
    translation: &'static str,
) -> SeedWord {
    seed.example = Some((sentence, translation));
    seed
}

// Four words per category so a category-only quiz still gets multiple choice.
static STARTER_WORDS: [SeedWord; 32] = [
    example(
        spoken(word("Selamat pagi", "Good morning", Greetings, Beginner), "se-LA-mat PA-gee"),
        "Selamat pagi, Bu!",
        "Good morning, ma'am!",
    ),
    spoken(word("Terima kasih", "Thank you", Greetings, Beginner), "te-REE-ma KA-see"),
    word("Sampai jumpa", "See you later", Greetings, Beginner),
    word("Apa kabar?", "How are you?", Greetings, Beginner),
    word("Satu", "One", Numbers, Beginner),
    word("Dua", "Two", Numbers, Beginner),
    word("Sepuluh", "Ten", Numbers, Beginner),
    spoken(word("Seratus", "One hundred", Numbers, Intermediate), "se-RA-tus"),
    word("Merah", "Red", Colors, Beginner),
    word("Biru", "Blue", Colors, Beginner),
    word("Hijau", "Green", Colors, Beginner),
    word("Kuning", "Yellow", Colors, Beginner),
    example(
        word("Nasi", "Rice", Food, Beginner),
        "Saya makan nasi goreng.",
        "I eat fried rice.",
    ),
    word("Air", "Water", Food, Beginner),
    word("Ayam", "Chicken", Food, Beginner),
    word("Pedas", "Spicy", Food, Intermediate),
    spoken(word("Kucing", "Cat", Animals, Beginner), "KOO-ching"),
    word("Anjing", "Dog", Animals, Beginner),
    word("Burung", "Bird", Animals, Beginner),
    word("Gajah", "Elephant", Animals, Intermediate),
    example(
        word("Bandara", "Airport", Travel, Intermediate),
        "Di mana bandara?",
        "Where is the airport?",
    ),
    word("Tiket", "Ticket", Travel, Beginner),
    word("Kereta", "Train", Travel, Beginner),
    word("Penginapan", "Lodging", Travel, Advanced),
    word("Rapat", "Meeting", Business, Intermediate),
    word("Kantor", "Office", Business, Beginner),
    word("Kontrak", "Contract", Business, Intermediate),
    spoken(word("Perusahaan", "Company", Business, Advanced), "pe-ru-SA-ha-an"),
    word("Rumah", "House", Daily, Beginner),
    word("Tidur", "To sleep", Daily, Beginner),
    example(
        word("Belanja", "To shop", Daily, Intermediate),
        "Kami belanja di pasar.",
        "We shop at the market.",
    ),
    word("Mandi", "To bathe", Daily, Beginner),
];

/// Stable id for the n-th starter word, so reseeding replaces instead of duplicating.
fn starter_id(index: usize) -> VocabularyId {
    VocabularyId::from_u128(0x5eed_0000 + index as u128)
}

#[derive(Debug)]
pub enum SeedError {
    Invalid(VocabularyError),
    Storage(StorageError),
}

impl std::fmt::Display for SeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedError::Invalid(err) => write!(f, "invalid starter word: {err}"),
            SeedError::Storage(err) => write!(f, "failed to store starter word: {err}"),
        }
    }
}

impl std::error::Error for SeedError {}

/// Upsert the starter catalog and return how many words were written.
///
/// Earlier words get later timestamps so the newest-first catalog lists them in order.
pub async fn seed_catalog(
    vocabulary: &dyn VocabularyRepository,
    clock: &Clock,
) -> Result<usize, SeedError> {
    let base = clock.now();
    let total = STARTER_WORDS.len();

    for (index, seed) in STARTER_WORDS.iter().enumerate() {
        let offset = i64::try_from(total - index).unwrap_or(i64::MAX);
        let entry = VocabularyEntry::new(
            starter_id(index),
            seed.word,
            seed.translation,
            seed.category,
            seed.difficulty,
            base + Duration::seconds(offset),
        )
        .map_err(SeedError::Invalid)?
        .with_pronunciation(seed.pronunciation.map(str::to_owned))
        .with_example(
            seed.example.map(|(sentence, _)| sentence.to_owned()),
            seed.example.map(|(_, translation)| translation.to_owned()),
        );

        vocabulary
            .upsert_entry(&entry)
            .await
            .map_err(SeedError::Storage)?;
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingo_core::model::VocabularyFilter;
    use lingo_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn reseeding_replaces_rather_than_duplicates() {
        let repo = InMemoryRepository::new();
        let clock = fixed_clock();

        assert_eq!(seed_catalog(&repo, &clock).await.unwrap(), 32);
        assert_eq!(seed_catalog(&repo, &clock).await.unwrap(), 32);

        let all = repo.list_entries(&VocabularyFilter::all()).await.unwrap();
        assert_eq!(all.len(), 32);
        assert_eq!(all[0].word(), "Selamat pagi");
        assert_eq!(all[0].pronunciation(), Some("se-LA-mat PA-gee"));
    }

    #[tokio::test]
    async fn every_category_supports_multiple_choice() {
        let repo = InMemoryRepository::new();
        seed_catalog(&repo, &fixed_clock()).await.unwrap();

        for category in Category::ALL {
            let filter = VocabularyFilter::all().with_category(Some(category));
            let words = repo.list_entries(&filter).await.unwrap();
            assert!(words.len() >= 4, "{} has {} words", category.label(), words.len());
        }
    }
}
