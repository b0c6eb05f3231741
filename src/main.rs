//! keibabot orchestrator daemon: ticks the race calendar, schedules the
//! bet executor for upcoming races, and fires it when the schedule is due.

use anyhow::{Context, Result};
use keibabot_backend::config::Config;
use keibabot_backend::credentials::{CredentialsProvider, EnvCredentialsProvider};
use keibabot_backend::executor::BetExecutor;
use keibabot_backend::gateway::{HttpIpatGateway, IpatGateway};
use keibabot_backend::odds_feed::OddsFeedClient;
use keibabot_backend::orchestrator::AutoBetOrchestrator;
use keibabot_backend::race_calendar::RaceCalendarClient;
use keibabot_backend::scheduler::{ScheduleStore, SqliteScheduleStore};
use keibabot_backend::store::{OrderStore, PredictionStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often the orchestrator re-polls the calendar and checks for due
/// schedules. Independent of `fire_lead_minutes`, which governs *when*
/// within that polling cadence a race actually fires.
const TICK_INTERVAL_SECS: u64 = 60;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("failed to load configuration")?;

    info!(user_id = %config.target_user_id, "keibabot orchestrator starting");

    let predictions = PredictionStore::new(&config.predictions_db_path)
        .context("failed to open prediction store")?;
    let orders = OrderStore::new(&config.orders_db_path).context("failed to open order store")?;
    let schedule_store: Arc<dyn ScheduleStore> = Arc::new(
        SqliteScheduleStore::new(&config.schedule_db_path).context("failed to open schedule store")?,
    );

    let odds_feed = OddsFeedClient::new(&config.odds_api_url);
    let calendar = RaceCalendarClient::new(&config.race_calendar_api_url);
    let gateway: Arc<dyn IpatGateway> = Arc::new(HttpIpatGateway::new(&config.gateway_api_url));
    let credentials: Arc<dyn CredentialsProvider> = Arc::new(EnvCredentialsProvider);

    let executor = Arc::new(BetExecutor::new(
        predictions,
        orders,
        odds_feed,
        gateway,
        credentials,
        config.target_user_id.clone(),
        config.bankroll_yen,
    ));

    let orchestrator = AutoBetOrchestrator::new(
        calendar,
        schedule_store,
        executor,
        config.orch_window_start_minutes,
        config.orch_window_minutes,
        config.fire_lead_minutes,
    );

    let mut ticker = interval(Duration::from_secs(TICK_INTERVAL_SECS));
    loop {
        ticker.tick().await;
        if let Err(e) = orchestrator.tick().await {
            error!(error = %e, "orchestrator tick failed");
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keibabot_backend=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
