//! Scraper→Store ingestion contract: the `Prediction` record schema and
//! its invariant checks. Per-site HTML/PDF parsing is explicitly out of
//! scope here — "only their output schema matters" — so this module
//! re-exports the contract surface rather than any live client.

pub use crate::models::{Prediction, RankedHorse, SourceName};

/// Re-validates a batch of freshly-scraped predictions before they reach
/// `PredictionStore::put`. `PredictionStore::put` calls `Prediction::validate`
/// itself too; this is for callers that want to reject a whole batch
/// up front (e.g. a scraper run that writes many races at once).
pub fn validate_batch(predictions: &[Prediction]) -> anyhow::Result<()> {
    for p in predictions {
        p.validate()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn batch_validation_surfaces_first_invalid_record() {
        let good = Prediction {
            race_id: "20260208_08_11".to_string(),
            source: SourceName::Umamax,
            predictions: vec![RankedHorse {
                horse_number: 3,
                rank: 1,
                score: 10.0,
            }],
            venue: "Kyoto".to_string(),
            race_number: 11,
            scraped_at: Utc::now(),
            ttl: Utc::now().timestamp() + 86_400,
        };
        let mut bad = good.clone();
        bad.predictions[0].horse_number = 99;

        assert!(validate_batch(&[good, bad]).is_err());
    }
}
