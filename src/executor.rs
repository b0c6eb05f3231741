//! BetExecutor: one invocation per race, six all-or-nothing phases — load,
//! odds, pipeline, convert, submit, finalize.

use crate::bets;
use crate::consensus;
use crate::credentials::CredentialsProvider;
use crate::error::PipelineError;
use crate::gateway::{IpatGateway, SubmitOutcome};
use crate::kernel;
use crate::kernel::constants::{AGREEMENT_TOP_N, MIN_SOURCES, PLACE_WEIGHTS, WIN_WEIGHTS};
use crate::models::{BetProposal, ConsensusResult, OrderStatus, PurchaseOrder, RaceId};
use crate::odds_feed::OddsFeedClient;
use crate::store::{OrderStore, PredictionStore};
use crate::wire::to_ipat_bet_line;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Outcome of one executor run, returned for the non-error paths.
#[derive(Debug, Clone)]
pub enum ExecutorOutcome {
    /// Fewer than 2 sources were present. Swallowed, not an error.
    InsufficientSources,
    /// The pipeline ran to completion; `order` carries the final status.
    Completed {
        order: PurchaseOrder,
        consensus: ConsensusResult,
        bet_count: usize,
    },
}

pub struct BetExecutor {
    predictions: PredictionStore,
    orders: OrderStore,
    odds_feed: OddsFeedClient,
    gateway: Arc<dyn IpatGateway>,
    credentials: Arc<dyn CredentialsProvider>,
    user_id: String,
    bankroll_yen: i64,
}

impl BetExecutor {
    pub fn new(
        predictions: PredictionStore,
        orders: OrderStore,
        odds_feed: OddsFeedClient,
        gateway: Arc<dyn IpatGateway>,
        credentials: Arc<dyn CredentialsProvider>,
        user_id: impl Into<String>,
        bankroll_yen: i64,
    ) -> Self {
        Self {
            predictions,
            orders,
            odds_feed,
            gateway,
            credentials,
            user_id: user_id.into(),
            bankroll_yen,
        }
    }

    /// Runs the full pipeline for one race. Strictly sequential; no
    /// internal idempotency — the orchestrator owns at-most-once
    /// scheduling.
    pub async fn run(&self, race_id: &str) -> Result<ExecutorOutcome, PipelineError> {
        // Phase 1: Load.
        let predictions = self
            .predictions
            .get_for_race(race_id)
            .await
            .map_err(PipelineError::PersistenceError)?;

        if predictions.len() < MIN_SOURCES {
            info!(race_id, source_count = predictions.len(), "insufficient sources, skipping race");
            return Ok(ExecutorOutcome::InsufficientSources);
        }

        // Phase 2: Odds.
        let odds = self.odds_feed.fetch_odds(race_id).await?;

        // Phase 3: Pipeline.
        let consensus_result = consensus::analyze(&predictions);

        let per_source = kernel::per_source_probs(&predictions);

        let mut proposals: Vec<BetProposal> = Vec::new();

        let win_fused = kernel::fuse(&per_source, &WIN_WEIGHTS);
        if !win_fused.is_empty() && !odds.win.is_empty() {
            let market = kernel::market_implied_probs(&odds.win);
            proposals.extend(bets::win::generate(&win_fused, &market, &odds.win, self.bankroll_yen));
        }

        let place_fused = kernel::fuse(&per_source, &PLACE_WEIGHTS);
        if !place_fused.is_empty() {
            let place_source_maps: Vec<_> = per_source.values().cloned().collect();
            let agreement = kernel::compute_agree_counts(&place_source_maps, AGREEMENT_TOP_N);

            if !odds.place.is_empty() {
                proposals.extend(bets::place::generate(&place_fused, &agreement, &odds.place));
            }
            if !odds.quinella_place.is_empty() {
                proposals.extend(bets::wide::generate(&place_fused, &agreement, &odds.quinella_place));
            }
            if !odds.quinella.is_empty() {
                proposals.extend(bets::quinella::generate(&place_fused, &agreement, &odds.quinella));
                proposals.extend(bets::exacta::generate(&place_fused, &agreement, &odds.quinella));
            }
        }

        info!(race_id, bet_count = proposals.len(), consensus = ?consensus_result.consensus_level, "pipeline produced proposals");

        // Phase 4: Convert.
        let parsed_race_id = RaceId::parse(race_id).map_err(|e| {
            PipelineError::ConfigurationError(format!("unparseable race_id {race_id}: {e}"))
        })?;
        let bet_lines: Vec<_> = proposals
            .iter()
            .map(|p| to_ipat_bet_line(&parsed_race_id, p))
            .collect();

        // Phase 5: Submit.
        let credentials = self.credentials.get_credentials(&self.user_id).await?;

        let mut order = PurchaseOrder::new(self.user_id.clone(), race_id.to_string(), bet_lines);
        order.status = OrderStatus::Submitted;
        order.updated_at = chrono::Utc::now();
        self.orders
            .save(&order)
            .await
            .map_err(PipelineError::PersistenceError)?;

        let submit_result = self.gateway.submit_bets(&credentials, &order.bet_lines).await;

        // Phase 6: Finalize.
        match submit_result {
            Ok(SubmitOutcome::Accepted) => {
                order.status = OrderStatus::Completed;
                order.updated_at = chrono::Utc::now();
                self.orders
                    .save(&order)
                    .await
                    .map_err(PipelineError::PersistenceError)?;
                info!(race_id, order_id = %order.order_id, "order completed");
                let bet_count = order.bet_lines.len();
                Ok(ExecutorOutcome::Completed {
                    order,
                    consensus: consensus_result,
                    bet_count,
                })
            }
            Ok(SubmitOutcome::Rejected) => {
                let message = "gateway rejected bet submission".to_string();
                order.status = OrderStatus::Failed;
                order.error_message = Some(message.clone());
                order.updated_at = chrono::Utc::now();
                if let Err(persist_err) = self.orders.save(&order).await {
                    // Open Question 2 (DESIGN.md): gateway may have actually
                    // placed the bet. Log with full context and surface the
                    // persistence failure rather than masking it.
                    error!(race_id, order_id = %order.order_id, error = %persist_err, "failed to persist FAILED order after gateway rejection");
                    return Err(PipelineError::PersistenceError(persist_err));
                }
                warn!(race_id, order_id = %order.order_id, message = %message, "order submission failed");
                Err(PipelineError::SubmissionFailed {
                    race_id: race_id.to_string(),
                    message,
                })
            }
            Ok(SubmitOutcome::Ambiguous) => {
                // We never learned whether the bet landed. Leaving the order
                // in SUBMITTED (already persisted in Phase 5) instead of
                // FAILED is deliberate: flipping it to FAILED would invite a
                // caller to retry and double-submit a bet that may have
                // actually gone through.
                let message = "gateway submit request never got a usable response".to_string();
                warn!(race_id, order_id = %order.order_id, "submission outcome unknown, order left SUBMITTED");
                Err(PipelineError::SubmissionAmbiguous {
                    race_id: race_id.to_string(),
                    message,
                })
            }
            Err(e) => {
                let message = e.to_string();
                warn!(race_id, order_id = %order.order_id, error = %message, "submission outcome unknown, order left SUBMITTED");
                Err(PipelineError::SubmissionAmbiguous {
                    race_id: race_id.to_string(),
                    message,
                })
            }
        }
    }
}
