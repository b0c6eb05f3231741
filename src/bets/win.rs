//! Win (tansyo) bet generator: Kelly-scaled stake on a fused/market edge.

use crate::kernel::constants::{WIN_EDGE_MAX, WIN_EDGE_MIN, WIN_EDGE_TILT_CENTER, WIN_KELLY_FRACTION};
use crate::models::{round_to_nearest_hundred_yen, BetProposal, BetType, FusedDistribution};
use std::collections::HashMap;

/// For each horse with an edge strictly greater than `WIN_EDGE_MIN` and at
/// most `WIN_EDGE_MAX` (the asymmetry is intentional and backtest-depended-on,
/// see DESIGN.md Open Question 1), sizes a
/// fractional-Kelly stake tilted by how close the edge sits to
/// `WIN_EDGE_TILT_CENTER`. `bankroll_yen` is the configured sizing base
/// (`Config::bankroll_yen`), not a fixed constant.
pub fn generate(
    fused: &FusedDistribution,
    market: &HashMap<u32, f64>,
    win_odds: &HashMap<String, f64>,
    bankroll_yen: i64,
) -> Vec<BetProposal> {
    let mut proposals = Vec::new();
    let mut horses: Vec<u32> = fused.keys().copied().collect();
    horses.sort_unstable();

    for horse in horses {
        let p = fused[&horse];
        let Some(&m) = market.get(&horse) else {
            continue;
        };
        let edge = p - m;
        if edge <= WIN_EDGE_MIN || edge > WIN_EDGE_MAX {
            continue;
        }

        let Some(&o) = win_odds.get(&format!("{horse:02}")) else {
            continue;
        };
        if o <= 1.0 {
            continue;
        }

        let kelly = (p * o - 1.0) / (o - 1.0);
        if kelly <= 0.0 {
            continue;
        }

        let stake = bankroll_yen as f64 * kelly * WIN_KELLY_FRACTION * (edge / WIN_EDGE_TILT_CENTER);
        let amount_yen = round_to_nearest_hundred_yen(stake);

        proposals.push(BetProposal {
            bet_type: BetType::Win,
            horse_numbers: vec![horse],
            amount_yen,
        });
    }

    proposals
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_BANKROLL: i64 = 100_000;

    #[test]
    fn edge_within_bounds_produces_bet() {
        let mut fused = HashMap::new();
        fused.insert(3u32, 0.25);
        let mut market = HashMap::new();
        market.insert(3u32, 0.21); // edge = 0.04, within (0.03, 0.05]
        let mut odds = HashMap::new();
        odds.insert("03".to_string(), 4.8);

        let bets = generate(&fused, &market, &odds, TEST_BANKROLL);
        assert_eq!(bets.len(), 1);
        assert_eq!(bets[0].horse_numbers, vec![3]);
        assert!(bets[0].amount_yen >= 100 && bets[0].amount_yen % 100 == 0);
    }

    #[test]
    fn edge_at_lower_bound_is_excluded() {
        let mut fused = HashMap::new();
        fused.insert(3u32, 0.24);
        let mut market = HashMap::new();
        market.insert(3u32, 0.21); // edge exactly 0.03, strict lower bound excludes it
        let mut odds = HashMap::new();
        odds.insert("03".to_string(), 4.8);
        assert!(generate(&fused, &market, &odds, TEST_BANKROLL).is_empty());
    }

    #[test]
    fn edge_above_upper_bound_is_excluded() {
        let mut fused = HashMap::new();
        fused.insert(3u32, 0.30);
        let mut market = HashMap::new();
        market.insert(3u32, 0.20); // edge 0.10, exceeds 0.05
        let mut odds = HashMap::new();
        odds.insert("03".to_string(), 4.8);
        assert!(generate(&fused, &market, &odds, TEST_BANKROLL).is_empty());
    }

    #[test]
    fn missing_odds_excludes_horse() {
        let mut fused = HashMap::new();
        fused.insert(3u32, 0.25);
        let mut market = HashMap::new();
        market.insert(3u32, 0.21);
        assert!(generate(&fused, &market, &HashMap::new(), TEST_BANKROLL).is_empty());
    }
}
