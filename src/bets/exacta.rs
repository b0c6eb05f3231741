//! Exacta (umatan) bet generator.
//!
//! Reuses the quinella odds slice — same key, order-independent — but
//! preserves finish order in the proposal.

use crate::kernel::constants::{EXACTA_AGREE_MIN, EXACTA_ODDS_MIN, EXACTA_TOP_N};
use crate::kernel::top_n_horses;
use crate::models::{pair_key, AgreementMap, BetProposal, BetType, FusedDistribution};
use std::collections::HashMap;

/// Top-3 fused horses; for every ordered pair `(h_upper, h_lower)` where
/// `h_upper` has strictly higher fused probability, requires agreement >=
/// 3 on both and quinella odds >= 15 for the (order-independent) pair key.
/// `horse_numbers` preserves `[h_upper, h_lower]` — never sorted.
pub fn generate(
    fused: &FusedDistribution,
    agreement: &AgreementMap,
    quinella_odds: &HashMap<String, f64>,
) -> Vec<BetProposal> {
    let top = top_n_horses(fused, EXACTA_TOP_N);
    let mut proposals = Vec::new();

    for i in 0..top.len() {
        for j in 0..top.len() {
            if i == j {
                continue;
            }
            let (h_upper, h_lower) = (top[i], top[j]);
            if fused[&h_upper] <= fused[&h_lower] {
                continue;
            }
            if agreement.get(&h_upper).copied().unwrap_or(0) < EXACTA_AGREE_MIN
                || agreement.get(&h_lower).copied().unwrap_or(0) < EXACTA_AGREE_MIN
            {
                continue;
            }
            let key = pair_key(h_upper, h_lower);
            let Some(&odds) = quinella_odds.get(&key) else {
                continue;
            };
            if odds < EXACTA_ODDS_MIN {
                continue;
            }
            proposals.push(BetProposal {
                bet_type: BetType::Exacta,
                horse_numbers: vec![h_upper, h_lower],
                amount_yen: 100,
            });
        }
    }

    proposals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_scenario_4_exacta_natural_order() {
        let fused: FusedDistribution = [(3, 0.45), (7, 0.35), (1, 0.20)].into_iter().collect();
        let agreement: AgreementMap = [(3, 4), (7, 4), (1, 4)].into_iter().collect();
        let quinella_odds: HashMap<String, f64> = [
            ("03-07".to_string(), 18.0),
            ("01-03".to_string(), 20.0),
            ("01-07".to_string(), 25.0),
        ]
        .into_iter()
        .collect();

        let bets = generate(&fused, &agreement, &quinella_odds);
        let pairs: Vec<Vec<u32>> = bets.into_iter().map(|b| b.horse_numbers).collect();
        assert_eq!(pairs, vec![vec![3, 7], vec![3, 1], vec![7, 1]]);
    }
}
