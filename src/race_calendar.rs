//! Race calendar feed client: the orchestrator's view of upcoming post
//! times for a given day.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarEntry {
    pub race_id: String,
    pub post_time: DateTime<Utc>,
}

#[derive(Clone)]
pub struct RaceCalendarClient {
    client: Client,
    base_url: String,
}

impl RaceCalendarClient {
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

    pub async fn fetch_today(&self) -> Result<Vec<CalendarEntry>> {
        let url = format!("{}/races/calendar", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("race calendar request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("race calendar feed returned {status}: {body}");
        }

        response
            .json::<Vec<CalendarEntry>>()
            .await
            .context("failed to parse race calendar response")
    }
}
