use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::models::{Prediction, RankedHorse, SourceName};

/// Persisted per-(race_id, source) predictions. Primary key is the pair;
/// reads fan out by `race_id` only (single-partition query).
#[derive(Clone)]
pub struct PredictionStore {
    conn: Arc<Mutex<Connection>>,
}

impl PredictionStore {
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).context("open prediction store")?;
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "synchronous", "NORMAL").ok();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS predictions (
                race_id TEXT NOT NULL,
                source TEXT NOT NULL,
                predictions_json TEXT NOT NULL,
                venue TEXT NOT NULL,
                race_number INTEGER NOT NULL,
                scraped_at TEXT NOT NULL,
                ttl INTEGER NOT NULL,
                PRIMARY KEY (race_id, source)
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_predictions_race_id ON predictions(race_id)",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Writes one source's prediction for a race. Immutable once written:
    /// a second write for the same (race_id, source) is rejected rather
    /// than silently overwritten.
    pub async fn put(&self, prediction: &Prediction) -> Result<()> {
        prediction.validate().context("prediction failed validation")?;
        let predictions_json = serde_json::to_string(&prediction.predictions)?;
        let conn = self.conn.lock().await;
        let rows = conn.execute(
            "INSERT OR IGNORE INTO predictions \
             (race_id, source, predictions_json, venue, race_number, scraped_at, ttl) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &prediction.race_id,
                prediction.source.as_str(),
                &predictions_json,
                &prediction.venue,
                prediction.race_number,
                prediction.scraped_at.to_rfc3339(),
                prediction.ttl,
            ],
        )?;
        if rows == 0 {
            info!(
                race_id = %prediction.race_id,
                source = %prediction.source,
                "prediction already recorded, ignoring write"
            );
        }
        Ok(())
    }

    /// All non-expired predictions for a race, across sources.
    pub async fn get_for_race(&self, race_id: &str) -> Result<Vec<Prediction>> {
        let now = Utc::now().timestamp();
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(
            "SELECT source, predictions_json, venue, race_number, scraped_at, ttl \
             FROM predictions WHERE race_id = ?1 AND ttl > ?2",
        )?;
        let rows = stmt.query_map(params![race_id, now], |row| {
            let source_str: String = row.get(0)?;
            let predictions_json: String = row.get(1)?;
            let venue: String = row.get(2)?;
            let race_number: u32 = row.get(3)?;
            let scraped_at: String = row.get(4)?;
            let ttl: i64 = row.get(5)?;
            Ok((source_str, predictions_json, venue, race_number, scraped_at, ttl))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (source_str, predictions_json, venue, race_number, scraped_at, ttl) = row?;
            let source: SourceName = source_str
                .parse()
                .with_context(|| format!("unknown source in store: {source_str}"))?;
            let predictions: Vec<RankedHorse> = serde_json::from_str(&predictions_json)?;
            let scraped_at = chrono::DateTime::parse_from_rfc3339(&scraped_at)
                .context("corrupt scraped_at timestamp")?
                .with_timezone(&Utc);
            out.push(Prediction {
                race_id: race_id.to_string(),
                source,
                predictions,
                venue,
                race_number,
                scraped_at,
                ttl,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RankedHorse;

    fn sample(race_id: &str, source: SourceName) -> Prediction {
        Prediction {
            race_id: race_id.to_string(),
            source,
            predictions: vec![
                RankedHorse { horse_number: 3, rank: 1, score: 10.0 },
                RankedHorse { horse_number: 7, rank: 2, score: 8.0 },
            ],
            venue: "Kyoto".to_string(),
            race_number: 11,
            scraped_at: Utc::now(),
            ttl: Utc::now().timestamp() + 86_400,
        }
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = PredictionStore::new(":memory:").unwrap();
        store.put(&sample("20260208_08_11", SourceName::Umamax)).await.unwrap();
        store.put(&sample("20260208_08_11", SourceName::MuryouKeibaAi)).await.unwrap();

        let found = store.get_for_race("20260208_08_11").await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn expired_predictions_are_excluded() {
        let store = PredictionStore::new(":memory:").unwrap();
        let mut pred = sample("20260208_08_11", SourceName::Umamax);
        pred.ttl = Utc::now().timestamp() - 1;
        store.put(&pred).await.unwrap();

        let found = store.get_for_race("20260208_08_11").await.unwrap();
        assert!(found.is_empty());
    }
}
