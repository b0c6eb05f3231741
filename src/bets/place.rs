//! Place (fukusyo) bet generator.

use crate::kernel::constants::{PLACE_AGREE_MIN, PLACE_MID_MAX, PLACE_MID_MIN, PLACE_TOP_N};
use crate::kernel::top_n_horses;
use crate::models::{AgreementMap, BetProposal, BetType, FusedDistribution, PlaceOddsRange};
use std::collections::HashMap;

/// Top-4 fused horses; each needs agreement >= 2 and a place-odds `mid`
/// inside `[3.0, 8.0]` to get a flat 100-yen bet.
pub fn generate(
    fused: &FusedDistribution,
    agreement: &AgreementMap,
    place_odds: &HashMap<String, PlaceOddsRange>,
) -> Vec<BetProposal> {
    top_n_horses(fused, PLACE_TOP_N)
        .into_iter()
        .filter(|h| agreement.get(h).copied().unwrap_or(0) >= PLACE_AGREE_MIN)
        .filter_map(|h| {
            let odds = place_odds.get(&format!("{h:02}"))?;
            if odds.mid >= PLACE_MID_MIN && odds.mid <= PLACE_MID_MAX {
                Some(BetProposal {
                    bet_type: BetType::Place,
                    horse_numbers: vec![h],
                    amount_yen: 100,
                })
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn odds(mid: f64) -> PlaceOddsRange {
        PlaceOddsRange {
            min: mid - 0.5,
            mid,
            max: mid + 0.5,
        }
    }

    #[test]
    fn spec_scenario_3_place_filter_boundary() {
        let fused: FusedDistribution = [(3, 0.40), (7, 0.25), (1, 0.20), (5, 0.15)]
            .into_iter()
            .collect();
        let agreement: AgreementMap = [(3, 4), (7, 3), (1, 3), (5, 1)].into_iter().collect();
        let place_odds: HashMap<String, PlaceOddsRange> = [
            ("03".to_string(), odds(1.55)),
            ("07".to_string(), odds(4.25)),
            ("01".to_string(), odds(3.5)),
            ("05".to_string(), odds(5.0)),
        ]
        .into_iter()
        .collect();

        let bets = generate(&fused, &agreement, &place_odds);
        let horses: Vec<u32> = bets.iter().flat_map(|b| b.horse_numbers.clone()).collect();
        assert_eq!(horses, vec![7, 1]);
        assert!(bets.iter().all(|b| b.amount_yen == 100));
    }
}
