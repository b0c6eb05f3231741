//! Odds feed client: `GET /races/{race_id}/odds`, with exponential-backoff
//! retry on timeout/5xx (up to 3 tries).

use crate::error::PipelineError;
use crate::models::MarketOdds;
use reqwest::Client;
use std::time::Duration;
use tracing::warn;

const MAX_ATTEMPTS: u32 = 3;
const BASE_BACKOFF_MS: u64 = 200;

#[derive(Clone)]
pub struct OddsFeedClient {
    client: Client,
    base_url: String,
}

impl OddsFeedClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client construction should never fail with static config");
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub async fn fetch_odds(&self, race_id: &str) -> Result<MarketOdds, PipelineError> {
        let url = format!("{}/races/{}/odds", self.base_url, race_id);
        let mut last_err: Option<anyhow::Error> = None;

        for attempt in 1..=MAX_ATTEMPTS {
            match self.try_fetch(&url).await {
                Ok(odds) => return Ok(odds),
                Err(e) => {
                    warn!(race_id, attempt, error = %e, "odds fetch attempt failed");
                    last_err = Some(e);
                    if attempt < MAX_ATTEMPTS {
                        let backoff = BASE_BACKOFF_MS * 2u64.pow(attempt - 1);
                        tokio::time::sleep(Duration::from_millis(backoff)).await;
                    }
                }
            }
        }

        Err(PipelineError::OddsUnavailable {
            race_id: race_id.to_string(),
            attempts: MAX_ATTEMPTS,
            source: last_err.unwrap_or_else(|| anyhow::anyhow!("unknown odds fetch failure")),
        })
    }

    async fn try_fetch(&self, url: &str) -> anyhow::Result<MarketOdds> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("odds feed returned {status}: {body}");
        }
        let odds = response.json::<MarketOdds>().await?;
        Ok(odds)
    }
}
