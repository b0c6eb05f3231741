//! Log-opinion pooling: geometric-mean fusion of per-source probability
//! distributions with per-source weights.

use std::collections::{HashMap, HashSet};

/// `prob_maps[i]` paired with `weights[i]`, weights already normalized to
/// sum to 1. `K` = intersection of all input maps' keys; horses present in
/// only a subset are excluded — a contract, not a bug.
pub fn log_opinion_pool(prob_maps: &[HashMap<u32, f64>], weights: &[f64]) -> HashMap<u32, f64> {
    assert_eq!(
        prob_maps.len(),
        weights.len(),
        "log_opinion_pool requires one weight per probability map"
    );

    if prob_maps.is_empty() {
        return HashMap::new();
    }

    let mut intersection: HashSet<u32> = prob_maps[0].keys().copied().collect();
    for map in &prob_maps[1..] {
        let keys: HashSet<u32> = map.keys().copied().collect();
        intersection = intersection.intersection(&keys).copied().collect();
    }
    if intersection.is_empty() {
        return HashMap::new();
    }

    let mut pooled: HashMap<u32, f64> = HashMap::with_capacity(intersection.len());
    for &horse in &intersection {
        let mut product = 1.0;
        for (map, weight) in prob_maps.iter().zip(weights) {
            let p = map[&horse];
            product *= p.powf(*weight);
        }
        pooled.insert(horse, product);
    }

    let total: f64 = pooled.values().sum();
    if total > 0.0 {
        for p in pooled.values_mut() {
            *p /= total;
        }
    }
    pooled
}

/// Normalizes a raw weight array against the subset of sources actually
/// present, so `Σw = 1` holds for `log_opinion_pool`'s contract.
pub fn normalize_weights(raw_weights: &[f64]) -> Vec<f64> {
    let total: f64 = raw_weights.iter().sum();
    if total <= 0.0 {
        let n = raw_weights.len() as f64;
        return vec![1.0 / n; raw_weights.len()];
    }
    raw_weights.iter().map(|w| w / total).collect()
}
