//! Wide (quinella_place) bet generator.

use crate::kernel::constants::{WIDE_AGREE_MIN, WIDE_ODDS_MIN, WIDE_TOP_N};
use crate::kernel::top_n_horses;
use crate::models::{pair_key, AgreementMap, BetProposal, BetType, FusedDistribution};
use std::collections::HashMap;

/// Top-5 fused horses; every unordered pair where both horses have
/// agreement >= 2 and the wide odds for the sorted pair are >= 10 gets a
/// flat 100-yen bet.
pub fn generate(
    fused: &FusedDistribution,
    agreement: &AgreementMap,
    wide_odds: &HashMap<String, f64>,
) -> Vec<BetProposal> {
    let top = top_n_horses(fused, WIDE_TOP_N);
    let mut proposals = Vec::new();

    for i in 0..top.len() {
        for j in (i + 1)..top.len() {
            let (h1, h2) = (top[i], top[j]);
            if agreement.get(&h1).copied().unwrap_or(0) < WIDE_AGREE_MIN
                || agreement.get(&h2).copied().unwrap_or(0) < WIDE_AGREE_MIN
            {
                continue;
            }
            let key = pair_key(h1, h2);
            let Some(&odds) = wide_odds.get(&key) else {
                continue;
            };
            if odds < WIDE_ODDS_MIN {
                continue;
            }
            let (lo, hi) = if h1 < h2 { (h1, h2) } else { (h2, h1) };
            proposals.push(BetProposal {
                bet_type: BetType::Wide,
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
    fn pair_needs_both_agreement_and_odds_threshold() {
        let fused: FusedDistribution = [(3, 0.3), (7, 0.25), (1, 0.2), (5, 0.15), (9, 0.1)]
            .into_iter()
            .collect();
        let agreement: AgreementMap =
            [(3, 3), (7, 2), (1, 1), (5, 2), (9, 2)].into_iter().collect();
        let wide_odds: HashMap<String, f64> = [
            ("03-07".to_string(), 12.0),
            ("01-03".to_string(), 20.0),
            ("03-05".to_string(), 9.0),
        ]
        .into_iter()
        .collect();

        let bets = generate(&fused, &agreement, &wide_odds);
        assert_eq!(bets.len(), 1);
        assert_eq!(bets[0].horse_numbers, vec![3, 7]);
    }
}
