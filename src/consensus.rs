//! ConsensusAnalyzer: classifies how much the prediction sources agree on
//! the top-3, and flags horses with high rank divergence across sources.

use crate::models::{ConsensusLevel, ConsensusResult, DivergenceHorse, Prediction};
use std::collections::{HashMap, HashSet};
use tracing::debug;

const DIVERGENCE_GAP_MIN: u32 = 3;

/// Takes each source's top-3 horses by rank, classifies the overlap into
/// one of four consensus levels, and flags any horse whose rank spread
/// across sources is wide enough to matter. Requires at least 2 sources;
/// callers should check `predictions.len() >= 2` upstream (executor does).
pub fn analyze(predictions: &[Prediction]) -> ConsensusResult {
    let top3_per_source: Vec<HashMap<u32, u32>> = predictions
        .iter()
        .map(|p| top3_by_rank(&p.predictions))
        .collect();

    let union: HashSet<u32> = top3_per_source
        .iter()
        .flat_map(|m| m.keys().copied())
        .collect();

    let agreed: Vec<u32> = union
        .iter()
        .copied()
        .filter(|h| top3_per_source.iter().all(|m| m.contains_key(h)))
        .collect();

    let consensus_level = classify(&agreed, &top3_per_source);
    debug!(
        agreed_count = agreed.len(),
        ?consensus_level,
        "consensus classified"
    );

    let divergence_horses = find_divergence(predictions);

    let mut agreed_sorted = agreed;
    agreed_sorted.sort_unstable();

    ConsensusResult {
        consensus_level,
        agreed_top3: agreed_sorted,
        divergence_horses,
    }
}

fn top3_by_rank(predictions: &[crate::models::RankedHorse]) -> HashMap<u32, u32> {
    predictions
        .iter()
        .filter(|h| h.rank <= 3)
        .map(|h| (h.horse_number, h.rank))
        .collect()
}

fn classify(agreed: &[u32], top3_per_source: &[HashMap<u32, u32>]) -> ConsensusLevel {
    if agreed.len() == 3 {
        let same_positions = agreed.iter().all(|h| {
            let ranks: HashSet<u32> = top3_per_source
                .iter()
                .filter_map(|m| m.get(h).copied())
                .collect();
            ranks.len() == 1
        });
        if same_positions {
            ConsensusLevel::Full
        } else {
            ConsensusLevel::Mostly
        }
    } else if agreed.len() == 2 {
        ConsensusLevel::Partial
    } else {
        ConsensusLevel::LargeDivergence
    }
}

/// Computes, for every horse appearing in any source's ranked list, the
/// gap between its best and worst rank across sources; keeps entries with
/// `gap >= DIVERGENCE_GAP_MIN`.
fn find_divergence(predictions: &[Prediction]) -> Vec<DivergenceHorse> {
    let mut ranks_per_horse: HashMap<u32, HashMap<String, u32>> = HashMap::new();
    for pred in predictions {
        for horse in &pred.predictions {
            ranks_per_horse
                .entry(horse.horse_number)
                .or_default()
                .insert(pred.source.as_str().to_string(), horse.rank);
        }
    }

    let mut out: Vec<DivergenceHorse> = ranks_per_horse
        .into_iter()
        .filter_map(|(horse_number, ranks_per_source)| {
            let min = *ranks_per_source.values().min()?;
            let max = *ranks_per_source.values().max()?;
            let gap = max - min;
            if gap >= DIVERGENCE_GAP_MIN {
                Some(DivergenceHorse {
                    horse_number,
                    ranks_per_source,
                    gap,
                })
            } else {
                None
            }
        })
        .collect();

    out.sort_by(|a, b| b.gap.cmp(&a.gap).then(a.horse_number.cmp(&b.horse_number)));
    out
}
