//! Top-N agreement counting across per-source probability maps.

use std::collections::HashMap;

/// For each source's map, takes the top-`top_n` horses by probability (ties
/// broken by ascending horse_number — kept stable so the filter cascade
/// downstream is deterministic); counts, per horse, how many sources place
/// it in their top-`top_n`.
pub fn compute_agree_counts(
    source_prob_maps: &[HashMap<u32, f64>],
    top_n: usize,
) -> HashMap<u32, u32> {
    let mut counts: HashMap<u32, u32> = HashMap::new();
    for map in source_prob_maps {
        for horse in top_n_horses(map, top_n) {
            *counts.entry(horse).or_insert(0) += 1;
        }
    }
    counts
}

/// Ranks a probability map descending, ties broken by ascending
/// horse_number, and returns the first `n` horse numbers.
pub fn top_n_horses(probs: &HashMap<u32, f64>, n: usize) -> Vec<u32> {
    let mut ranked: Vec<(u32, f64)> = probs.iter().map(|(&h, &p)| (h, p)).collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked.into_iter().take(n).map(|(h, _)| h).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(u32, f64)]) -> HashMap<u32, f64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn top_n_breaks_ties_ascending() {
        let probs = map(&[(5, 0.3), (2, 0.3), (9, 0.1)]);
        let top = top_n_horses(&probs, 2);
        assert_eq!(top, vec![2, 5]);
    }

    #[test]
    fn agree_counts_across_sources() {
        let a = map(&[(3, 0.5), (7, 0.3), (1, 0.2)]);
        let b = map(&[(3, 0.4), (1, 0.35), (9, 0.25)]);
        let counts = compute_agree_counts(&[a, b], 2);
        assert_eq!(counts.get(&3), Some(&2));
        assert_eq!(counts.get(&1), Some(&2));
        assert_eq!(counts.get(&7), None);
    }
}
