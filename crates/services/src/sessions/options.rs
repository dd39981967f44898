use rand::Rng;
use rand::seq::SliceRandom;

use lingo_core::model::VocabularyEntry;

/// Answers shown per quiz question: the correct one plus three distractors.
pub const OPTION_COUNT: usize = 4;

const DISTRACTOR_COUNT: usize = OPTION_COUNT - 1;

/// Shuffled answer set for `entries[current]`.
///
/// Distractors are distinct translations of the other session entries that
/// differ from the correct translation. Pools smaller than `OPTION_COUNT`
/// produce an empty set.
pub fn build_options<R: Rng + ?Sized>(
    entries: &[VocabularyEntry],
    current: usize,
    rng: &mut R,
) -> Vec<String> {
    if entries.len() < OPTION_COUNT {
        return Vec::new();
    }
    let Some(target) = entries.get(current) else {
        return Vec::new();
    };
    let correct = target.translation();

    let mut distractors: Vec<&str> = Vec::with_capacity(entries.len() - 1);
    for (i, entry) in entries.iter().enumerate() {
        let candidate = entry.translation();
        if i != current && candidate != correct && !distractors.contains(&candidate) {
            distractors.push(candidate);
        }
    }
    distractors.shuffle(rng);
    distractors.truncate(DISTRACTOR_COUNT);

    let mut options: Vec<String> = distractors.into_iter().map(str::to_owned).collect();
    options.push(correct.to_owned());
    options.shuffle(rng);
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    use lingo_core::model::{Category, Difficulty, VocabularyId};
    use lingo_core::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn entries(translations: &[&str]) -> Vec<VocabularyEntry> {
        translations
            .iter()
            .enumerate()
            .map(|(i, t)| {
                VocabularyEntry::new(
                    VocabularyId::from_u128(i as u128 + 1),
                    format!("kata{i}"),
                    *t,
                    Category::Daily,
                    Difficulty::Beginner,
                    fixed_now(),
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn option_set_has_correct_answer_and_three_distractors() {
        let pool = entries(&["one", "two", "three", "four", "five", "six"]);
        let mut rng = StdRng::seed_from_u64(3);

        for current in 0..pool.len() {
            let options = build_options(&pool, current, &mut rng);
            assert_eq!(options.len(), OPTION_COUNT);
            let correct = pool[current].translation();
            assert_eq!(options.iter().filter(|o| *o == correct).count(), 1);
            let unique: HashSet<_> = options.iter().collect();
            assert_eq!(unique.len(), OPTION_COUNT);
        }
    }

    #[test]
    fn small_pool_yields_no_options() {
        let pool = entries(&["one", "two", "three"]);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(build_options(&pool, 0, &mut rng).is_empty());
    }

    #[test]
    fn duplicate_translations_never_pose_as_distractors() {
        let pool = entries(&["hello", "hello", "bye", "thanks", "hello"]);
        let mut rng = StdRng::seed_from_u64(11);

        let options = build_options(&pool, 0, &mut rng);
        assert_eq!(options.iter().filter(|o| *o == "hello").count(), 1);
        // only two distinct other translations exist
        assert_eq!(options.len(), 3);
    }

    #[test]
    fn seeded_rng_fixes_the_ordering() {
        let pool = entries(&["a", "b", "c", "d", "e", "f", "g"]);
        let first = build_options(&pool, 2, &mut StdRng::seed_from_u64(99));
        let second = build_options(&pool, 2, &mut StdRng::seed_from_u64(99));
        assert_eq!(first, second);
    }

    #[test]
    fn every_distractor_is_reachable() {
        let pool = entries(&["a", "b", "c", "d", "e", "f"]);
        let mut rng = StdRng::seed_from_u64(5);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            for option in build_options(&pool, 0, &mut rng) {
                seen.insert(option);
            }
        }
        assert_eq!(seen.len(), pool.len());
    }
}
