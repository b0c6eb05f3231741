//! Score-to-probability conversion, the first stage of the fusion pipeline.

use crate::models::{RankedHorse, SourceName};
use std::collections::HashMap;

/// `exp(β·(sᵢ − max(s))) / Σⱼ exp(β·(sⱼ − max(s)))`. Subtracting the max is
/// required: it keeps the exponentials bounded and is what makes this
/// bit-identical to the reference implementation, not just numerically
/// equivalent to it.
pub fn softmax(scores: &[f64], beta: f64) -> Vec<f64> {
    if scores.is_empty() {
        return Vec::new();
    }
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (beta * (s - max)).exp()).collect();
    let sum: f64 = exps.iter().sum();
    if sum == 0.0 {
        let n = scores.len() as f64;
        return vec![1.0 / n; scores.len()];
    }
    exps.into_iter().map(|e| e / sum).collect()
}

/// Applies `softmax` over one source's ranked-score sequence, keeping the
/// horse_number association.
pub fn source_to_probs(predictions: &[RankedHorse], beta: f64) -> HashMap<u32, f64> {
    let scores: Vec<f64> = predictions.iter().map(|h| h.score).collect();
    let probs = softmax(&scores, beta);
    predictions
        .iter()
        .zip(probs)
        .map(|(h, p)| (h.horse_number, p))
        .collect()
}

/// Looks up the beta for a source in `kernel::constants::BETAS`.
pub fn beta_for_source(source: SourceName) -> f64 {
    use crate::kernel::constants::{BETAS, SOURCES};
    SOURCES
        .iter()
        .position(|s| *s == source)
        .map(|idx| BETAS[idx])
        .expect("SOURCES and BETAS are parallel arrays covering every SourceName variant")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn softmax_sums_to_one_and_is_positive() {
        let scores = vec![10.0, 8.0, 5.0, 1.0];
        let probs = softmax(&scores, 0.05);
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-10);
        assert!(probs.iter().all(|p| *p > 0.0));
    }

    #[test]
    fn softmax_is_monotone_decreasing_with_rank_when_beta_positive() {
        let scores = vec![10.0, 8.0, 5.0, 1.0];
        let probs = softmax(&scores, 0.05);
        for window in probs.windows(2) {
            assert!(window[0] > window[1]);
        }
    }

    #[test]
    fn softmax_handles_large_scores_without_overflow() {
        let scores = vec![1e6, 1e6 - 1.0, 1e6 - 5.0];
        let probs = softmax(&scores, 1.0);
        assert!(probs.iter().all(|p| p.is_finite() && *p > 0.0));
    }
}
