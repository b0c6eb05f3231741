//! IpatGateway: submit bets / query balance against the external
//! pari-mutuel HTTP service. Credentials are carried in the JSON body,
//! with no request signing (see DESIGN.md for the dependency-drop note).

use crate::credentials::IpatCredentials;
use crate::models::IpatBetLine;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
struct BetLineWire<'a> {
    opdt: &'a str,
    venue_code: &'a str,
    rno: String,
    bet_type: &'static str,
    number: &'a str,
    bet_price: String,
}

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    tncid: &'a str,
    tncpw: &'a str,
    bet_lines: Vec<BetLineWire<'a>>,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    ret: String,
    msg: String,
    #[serde(default)]
    #[allow(dead_code)]
    results: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct BalanceRequest<'a> {
    tncid: &'a str,
    tncpw: &'a str,
    subscriber_no: &'a str,
    pin: &'a str,
    pars_no: &'a str,
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    ret: String,
    msg: String,
    dedicated: i64,
    settlable: i64,
    bettable: i64,
    limit: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct Balance {
    pub dedicated: i64,
    pub settlable: i64,
    pub bettable: i64,
    pub limit: i64,
}

/// Result of a submit attempt. `Ambiguous` covers every case where we never
/// received a usable response — connection refused, timeout, a response
/// that failed to parse — and therefore can't tell whether the bet landed.
/// Conflating it with `Rejected` would let a caller retry and double-submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    Rejected,
    Ambiguous,
}

#[async_trait]
pub trait IpatGateway: Send + Sync {
    async fn submit_bets(
        &self,
        credentials: &IpatCredentials,
        bet_lines: &[IpatBetLine],
    ) -> Result<SubmitOutcome>;
    async fn get_balance(&self, credentials: &IpatCredentials) -> Result<Balance>;
}

pub struct HttpIpatGateway {
    client: Client,
    base_url: String,
}

impl HttpIpatGateway {
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
}

#[async_trait]
impl IpatGateway for HttpIpatGateway {
    async fn submit_bets(
        &self,
        credentials: &IpatCredentials,
        bet_lines: &[IpatBetLine],
    ) -> Result<SubmitOutcome> {
        let wire_lines: Vec<BetLineWire> = bet_lines
            .iter()
            .map(|l| BetLineWire {
                opdt: &l.opdt,
                venue_code: &l.venue_code,
                rno: format!("{:02}", l.race_number),
                bet_type: l.bet_type.ipat_bet_type(),
                number: &l.number,
                bet_price: l.amount.to_string(),
            })
            .collect();

        let request = SubmitRequest {
            tncid: &credentials.inet_id,
            tncpw: &credentials.pin,
            bet_lines: wire_lines,
        };

        let url = format!("{}/api/bet/submit", self.base_url);
        info!(url = %url, line_count = bet_lines.len(), "submitting bet lines to gateway");

        let response = match self.client.post(&url).json(&request).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(url = %url, error = %e, "gateway submit request never got a response");
                return Ok(SubmitOutcome::Ambiguous);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "gateway rejected bet submission with error status");
            return Ok(SubmitOutcome::Rejected);
        }

        let parsed: SubmitResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "gateway submit response didn't parse; outcome unknown");
                return Ok(SubmitOutcome::Ambiguous);
            }
        };

        if parsed.ret != "0" {
            warn!(ret = %parsed.ret, msg = %parsed.msg, "gateway rejected bet submission");
            return Ok(SubmitOutcome::Rejected);
        }

        Ok(SubmitOutcome::Accepted)
    }

    async fn get_balance(&self, credentials: &IpatCredentials) -> Result<Balance> {
        let request = BalanceRequest {
            tncid: &credentials.inet_id,
            tncpw: &credentials.pin,
            subscriber_no: &credentials.subscriber_number,
            pin: &credentials.pin,
            pars_no: &credentials.pars_number,
        };

        let url = format!("{}/api/bet/balance", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("gateway balance request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("gateway balance request failed ({status}): {body}"));
        }

        let parsed: BalanceResponse = response
            .json()
            .await
            .context("failed to parse gateway balance response")?;

        if parsed.ret != "0" {
            return Err(anyhow!("gateway balance query rejected: {}", parsed.msg));
        }

        Ok(Balance {
            dedicated: parsed.dedicated,
            settlable: parsed.settlable,
            bettable: parsed.bettable,
            limit: parsed.limit,
        })
    }
}
