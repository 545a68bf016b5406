use rand::Rng;
use rand::seq::IndexedRandom;

use crate::store::{VocabEntry, VocabStore};

pub const DEFAULT_MAX_WORDS: usize = 10;
pub const DEFAULT_MASTERY_THRESHOLD: u32 = 7;

/// Choose the words for one drill round.
///
/// Draws a uniform sample without replacement of `min(max_count, eligible)`
/// entries among those with `mastery <= threshold`. Returns an empty list when
/// nothing is eligible.
pub fn select_for_drill<R>(
    store: &VocabStore,
    max_count: usize,
    threshold: u32,
    rng: &mut R,
) -> Vec<String>
where
    R: Rng + ?Sized,
{
    let eligible: Vec<&VocabEntry> = store.iter().filter(|e| e.mastery <= threshold).collect();
    let amount = max_count.min(eligible.len());

    eligible
        .choose_multiple(rng, amount)
        .map(|e| e.entry.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn store_with(scores: &[u32]) -> VocabStore {
        let mut store = VocabStore::new();
        for (i, &mastery) in scores.iter().enumerate() {
            store.insert(VocabEntry {
                mastery,
                ..VocabEntry::new(format!("mot{i}"))
            });
        }
        store
    }

    #[test]
    fn bounded_by_max_and_eligible_count() {
        let store = store_with(&[0, 3, 7, 8, 10, 1, 2, 5, 6, 4, 0, 9, 7]);
        let eligible = store.iter().filter(|e| e.mastery <= 7).count();
        let mut rng = StdRng::seed_from_u64(7);

        for k in [0, 1, 5, 10, 50] {
            let words = select_for_drill(&store, k, 7, &mut rng);
            assert_eq!(words.len(), k.min(eligible));
            let unique: HashSet<_> = words.iter().collect();
            assert_eq!(unique.len(), words.len());
            for word in &words {
                assert!(store.get(word).is_some_and(|e| e.mastery <= 7));
            }
        }
    }

    #[test]
    fn nothing_eligible_yields_empty() {
        let store = store_with(&[8, 9, 10]);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(select_for_drill(&store, 10, 7, &mut rng).is_empty());
        assert!(select_for_drill(&VocabStore::new(), 10, 7, &mut rng).is_empty());
    }

    #[test]
    fn every_eligible_word_can_be_drawn() {
        let store = store_with(&[0, 1, 2, 3, 9]);
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            seen.extend(select_for_drill(&store, 1, 7, &mut rng));
        }
        assert_eq!(seen.len(), 4);
        assert!(!seen.contains("mot4"));
    }
}
