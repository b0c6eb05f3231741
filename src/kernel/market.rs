//! Market-implied probabilities from win odds.

use std::collections::HashMap;

/// For each horse with odds `o > 0`, computes `1/o` then renormalizes so
/// the result sums to 1. Entries with `o <= 0` are dropped.
pub fn market_implied_probs(win_odds: &HashMap<String, f64>) -> HashMap<u32, f64> {
    let mut implied: HashMap<u32, f64> = HashMap::new();
    for (key, &odds) in win_odds {
        if odds <= 0.0 {
            continue;
        }
        let Ok(horse_number) = key.parse::<u32>() else {
            continue;
        };
        implied.insert(horse_number, 1.0 / odds);
    }

    let total: f64 = implied.values().sum();
    if total > 0.0 {
        for p in implied.values_mut() {
            *p /= total;
        }
    }
    implied
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implied_probs_sum_to_one_and_drop_nonpositive() {
        let mut odds = HashMap::new();
        odds.insert("3".to_string(), 4.8);
        odds.insert("7".to_string(), 5.3);
        odds.insert("1".to_string(), 0.0);
        let implied = market_implied_probs(&odds);
        assert_eq!(implied.len(), 2);
        let sum: f64 = implied.values().sum();
        assert!((sum - 1.0).abs() < 1e-10);
        assert!(implied.values().all(|p| *p > 0.0 && *p < 1.0));
    }
}
