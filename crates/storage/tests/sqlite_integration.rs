use chrono::{Duration, NaiveDate};
use lingo_core::Url;
use lingo_core::model::{
    Category, Difficulty, FavoriteMark, ProfileRecord, ProgressRecord, QuizResult, UserId,
    VocabularyEntry, VocabularyFilter, VocabularyId,
};
use lingo_core::time::fixed_now;
use storage::StorageError;
use storage::repository::{
    FavoriteRepository, ProfileRepository, ProgressRepository, QuizResultRepository,
    VocabularyRepository,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn entry(
    n: u128,
    word: &str,
    translation: &str,
    category: Category,
    minutes: i64,
) -> VocabularyEntry {
    VocabularyEntry::new(
        VocabularyId::from_u128(n),
        word,
        translation,
        category,
        Difficulty::Beginner,
        fixed_now() + Duration::minutes(minutes),
    )
    .unwrap()
}

#[tokio::test]
async fn vocabulary_roundtrips_optional_aids() {
    let repo = connect("memdb_vocab_roundtrip").await;

    let e = entry(1, "kucing", "cat", Category::Animals, 0)
        .with_pronunciation(Some("koo-ching".into()))
        .with_example(Some("Kucing tidur".into()), Some("The cat sleeps".into()))
        .with_media(Some(Url::parse("https://cdn.example.com/kucing.mp3").unwrap()), None);
    repo.upsert_entry(&e).await.unwrap();

    let fetched = repo.get_entry(e.id()).await.unwrap().expect("entry");
    assert_eq!(fetched, e);
    assert!(repo.get_entry(VocabularyId::from_u128(99)).await.unwrap().is_none());
}

#[tokio::test]
async fn vocabulary_upsert_replaces_content() {
    let repo = connect("memdb_vocab_upsert").await;

    repo.upsert_entry(&entry(1, "merah", "red", Category::Colors, 0))
        .await
        .unwrap();
    repo.upsert_entry(&entry(1, "merah", "red colour", Category::Colors, 0))
        .await
        .unwrap();

    let all = repo.list_entries(&VocabularyFilter::all()).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].translation(), "red colour");
}

#[tokio::test]
async fn vocabulary_filters_combine() {
    let repo = connect("memdb_vocab_filter").await;

    repo.upsert_entry(&entry(1, "Selamat Pagi", "Good Morning", Category::Greetings, 0))
        .await
        .unwrap();
    repo.upsert_entry(&entry(2, "Selamat Malam", "Good Night", Category::Greetings, 1))
        .await
        .unwrap();
    repo.upsert_entry(&entry(3, "nasi", "rice", Category::Food, 2))
        .await
        .unwrap();
    repo.upsert_entry(&entry(4, "sekolah", "ÉCOLE", Category::Daily, -1))
        .await
        .unwrap();

    let greetings = repo
        .list_entries(&VocabularyFilter::all().with_category(Some(Category::Greetings)))
        .await
        .unwrap();
    let words: Vec<_> = greetings.iter().map(VocabularyEntry::word).collect();
    assert_eq!(words, vec!["Selamat Malam", "Selamat Pagi"]);

    let searched = repo
        .list_entries(&VocabularyFilter::all().with_search(Some("MORN".into())))
        .await
        .unwrap();
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].word(), "Selamat Pagi");

    let accented = repo
        .list_entries(&VocabularyFilter::all().with_search(Some("école".into())))
        .await
        .unwrap();
    let words: Vec<_> = accented.iter().map(VocabularyEntry::word).collect();
    assert_eq!(words, vec!["sekolah"]);

    let first_selamat = repo
        .list_entries(
            &VocabularyFilter::all()
                .with_search(Some("selamat".into()))
                .with_limit(Some(1)),
        )
        .await
        .unwrap();
    let words: Vec<_> = first_selamat.iter().map(VocabularyEntry::word).collect();
    assert_eq!(words, vec!["Selamat Malam"]);

    let limited = repo
        .list_entries(&VocabularyFilter::all().with_limit(Some(2)))
        .await
        .unwrap();
    let words: Vec<_> = limited.iter().map(VocabularyEntry::word).collect();
    assert_eq!(words, vec!["nasi", "Selamat Malam"]);

    let none = repo
        .list_entries(
            &VocabularyFilter::all()
                .with_category(Some(Category::Food))
                .with_difficulty(Some(Difficulty::Advanced)),
        )
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn progress_inserts_once_and_updates() {
    let repo = connect("memdb_progress").await;
    let word = entry(1, "satu", "one", Category::Numbers, 0);
    repo.upsert_entry(&word).await.unwrap();
    let user = UserId::random();

    let mut record = ProgressRecord::first_attempt(user, word.id(), true, fixed_now());
    repo.insert_progress(&record).await.unwrap();
    assert!(matches!(
        repo.insert_progress(&record).await,
        Err(StorageError::Conflict)
    ));

    record.apply_attempt(false, fixed_now() + Duration::minutes(5));
    repo.update_progress(&record).await.unwrap();

    let stored = repo.get_progress(user, word.id()).await.unwrap().unwrap();
    assert_eq!(stored, record);
    assert_eq!(stored.times_practiced(), 2);
    assert_eq!(stored.mastery_level().value(), 2);

    assert_eq!(repo.list_progress(user).await.unwrap().len(), 1);
    assert!(repo.list_progress(UserId::random()).await.unwrap().is_empty());
}

#[tokio::test]
async fn progress_update_without_row_is_not_found() {
    let repo = connect("memdb_progress_missing").await;
    let word = entry(1, "dua", "two", Category::Numbers, 0);
    repo.upsert_entry(&word).await.unwrap();

    let record = ProgressRecord::first_attempt(UserId::random(), word.id(), false, fixed_now());
    assert!(matches!(
        repo.update_progress(&record).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn profile_roundtrips_streak_and_xp() {
    let repo = connect("memdb_profile").await;
    let user = UserId::random();
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

    let mut profile = ProfileRecord::new(user, Some("rina".into()), fixed_now());
    repo.insert_profile(&profile).await.unwrap();
    assert!(matches!(
        repo.insert_profile(&profile).await,
        Err(StorageError::Conflict)
    ));

    profile.record_session_day(today, fixed_now());
    profile.add_xp(250, today, fixed_now()).unwrap();
    repo.update_profile(&profile).await.unwrap();

    let stored = repo.get_profile(user).await.unwrap().unwrap();
    assert_eq!(stored, profile);
    assert_eq!(stored.current_level(), 3);
    assert_eq!(stored.streak_days(), 1);
    assert_eq!(stored.last_activity_date(), Some(today));

    let stranger = ProfileRecord::new(UserId::random(), None, fixed_now());
    assert!(matches!(
        repo.update_profile(&stranger).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn favorites_toggle_and_list_newest_first() {
    let repo = connect("memdb_favorites").await;
    let a = entry(1, "apel", "apple", Category::Food, 0);
    let b = entry(2, "anjing", "dog", Category::Animals, 1);
    repo.upsert_entry(&a).await.unwrap();
    repo.upsert_entry(&b).await.unwrap();
    let user = UserId::random();

    repo.insert_favorite(&FavoriteMark::new(user, a.id(), fixed_now()))
        .await
        .unwrap();
    repo.insert_favorite(&FavoriteMark::new(
        user,
        b.id(),
        fixed_now() + Duration::minutes(1),
    ))
    .await
    .unwrap();
    assert!(matches!(
        repo.insert_favorite(&FavoriteMark::new(user, a.id(), fixed_now()))
            .await,
        Err(StorageError::Conflict)
    ));

    let listed: Vec<_> = repo
        .list_favorites(user)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.vocabulary_id)
        .collect();
    assert_eq!(listed, vec![b.id(), a.id()]);

    repo.delete_favorite(user, a.id()).await.unwrap();
    assert!(repo.find_favorite(user, a.id()).await.unwrap().is_none());
    assert!(matches!(
        repo.delete_favorite(user, a.id()).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn quiz_results_are_appended_and_listed_newest_first() {
    let repo = connect("memdb_quiz_results").await;
    let user = UserId::random();

    let first = QuizResult::new(user, Some(Category::Food), 7, 10, 105, fixed_now()).unwrap();
    let second = QuizResult::new(
        user,
        None,
        10,
        10,
        150,
        fixed_now() + Duration::minutes(10),
    )
    .unwrap();

    let id1 = repo.append_result(&first).await.unwrap();
    let id2 = repo.append_result(&second).await.unwrap();
    assert!(id2 > id1);

    let rows = repo.list_results(user, 10).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, id2);
    assert_eq!(rows[0].result, second);
    assert_eq!(rows[1].result, first);

    assert_eq!(repo.list_results(user, 1).await.unwrap().len(), 1);
    assert!(repo.list_results(UserId::random(), 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
}
