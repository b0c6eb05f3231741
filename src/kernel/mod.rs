//! ProbabilityKernel: pure stateless fusion math, no I/O.
//!
//! softmax → source_to_probs → log_opinion_pool / market_implied_probs /
//! compute_agree_counts. Every constant here is backtest-fixed; changing
//! one changes the bet proposals downstream.

pub mod agreement;
pub mod constants;
pub mod fusion;
pub mod market;
pub mod softmax;

pub use agreement::{compute_agree_counts, top_n_horses};
pub use fusion::{log_opinion_pool, normalize_weights};
pub use market::market_implied_probs;
pub use softmax::{beta_for_source, source_to_probs};

use crate::models::{FusedDistribution, Prediction, SourceName};
use constants::SOURCES;
use std::collections::HashMap;

/// Runs `softmax` per present source, keyed by source. Missing sources
/// (not in `predictions`) are simply absent from the result — the caller
/// renormalizes weights against whatever subset is present.
pub fn per_source_probs(predictions: &[Prediction]) -> HashMap<SourceName, HashMap<u32, f64>> {
    predictions
        .iter()
        .map(|pred| {
            let beta = beta_for_source(pred.source);
            (pred.source, source_to_probs(&pred.predictions, beta))
        })
        .collect()
}

/// Fuses present sources' probability maps with the given per-source
/// weight table (e.g. `constants::WIN_WEIGHTS`), renormalizing the weights
/// against the present subset first.
pub fn fuse(
    per_source: &HashMap<SourceName, HashMap<u32, f64>>,
    weight_table: &[f64; 4],
) -> FusedDistribution {
    let mut maps = Vec::with_capacity(per_source.len());
    let mut raw_weights = Vec::with_capacity(per_source.len());
    for (idx, source) in SOURCES.iter().enumerate() {
        if let Some(map) = per_source.get(source) {
            maps.push(map.clone());
            raw_weights.push(weight_table[idx]);
        }
    }
    let weights = normalize_weights(&raw_weights);
    log_opinion_pool(&maps, &weights)
}
