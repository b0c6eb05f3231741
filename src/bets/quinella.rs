//! Quinella (umaren) bet generator.

use crate::kernel::constants::{QUINELLA_AGREE_MIN, QUINELLA_ODDS_MIN, QUINELLA_TOP_N};
use crate::kernel::top_n_horses;
use crate::models::{pair_key, AgreementMap, BetProposal, BetType, FusedDistribution};
use std::collections::HashMap;

/// Top-3 fused horses; every unordered pair where both horses have
/// agreement >= 3 and the quinella odds for the sorted pair are >= 15 gets
/// a flat 100-yen bet.
pub fn generate(
    fused: &FusedDistribution,
    agreement: &AgreementMap,
    quinella_odds: &HashMap<String, f64>,
) -> Vec<BetProposal> {
    let top = top_n_horses(fused, QUINELLA_TOP_N);
    let mut proposals = Vec::new();

    for i in 0..top.len() {
        for j in (i + 1)..top.len() {
            let (h1, h2) = (top[i], top[j]);
            if agreement.get(&h1).copied().unwrap_or(0) < QUINELLA_AGREE_MIN
                || agreement.get(&h2).copied().unwrap_or(0) < QUINELLA_AGREE_MIN
            {
                continue;
            }
            let key = pair_key(h1, h2);
            let Some(&odds) = quinella_odds.get(&key) else {
                continue;
            };
            if odds < QUINELLA_ODDS_MIN {
                continue;
            }
            let (lo, hi) = if h1 < h2 { (h1, h2) } else { (h2, h1) };
            proposals.push(BetProposal {
                bet_type: BetType::Quinella,
                horse_numbers: vec![lo, hi],
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
    fn pair_needs_agreement_three_and_odds_threshold() {
        let fused: FusedDistribution = [(3, 0.4), (7, 0.35), (1, 0.25)].into_iter().collect();
        let agreement: AgreementMap = [(3, 4), (7, 4), (1, 3)].into_iter().collect();
        let quinella_odds: HashMap<String, f64> = [
            ("03-07".to_string(), 18.0),
            ("01-03".to_string(), 20.0),
            ("01-07".to_string(), 10.0),
        ]
        .into_iter()
        .collect();

        let bets = generate(&fused, &agreement, &quinella_odds);
        let pairs: Vec<Vec<u32>> = bets.into_iter().map(|b| b.horse_numbers).collect();
        assert!(pairs.contains(&vec![3, 7]));
        assert!(pairs.contains(&vec![1, 3]));
        assert!(!pairs.contains(&vec![1, 7]));
    }
}
