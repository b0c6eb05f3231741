//! One-shot CLI: runs the six-phase bet pipeline for a single race and
//! exits. Useful for manual firing or for ops replaying a missed schedule.

use anyhow::{Context, Result};
use clap::Parser;
use keibabot_backend::config::Config;
use keibabot_backend::credentials::{CredentialsProvider, EnvCredentialsProvider};
use keibabot_backend::executor::{BetExecutor, ExecutorOutcome};
use keibabot_backend::gateway::{HttpIpatGateway, IpatGateway};
use keibabot_backend::odds_feed::OddsFeedClient;
use keibabot_backend::store::{OrderStore, PredictionStore};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(about = "Run the bet pipeline once for a single race")]
struct Args {
    /// Race id, e.g. 20260208_08_11
    race_id: String,

    /// User whose credentials and bankroll drive this run.
    #[arg(long, env = "TARGET_USER_ID")]
    user_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keibabot_backend=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = Config::from_env().context("failed to load configuration")?;
    let user_id = args.user_id.unwrap_or(config.target_user_id.clone());

    let predictions = PredictionStore::new(&config.predictions_db_path)
        .context("failed to open prediction store")?;
    let orders = OrderStore::new(&config.orders_db_path).context("failed to open order store")?;
    let odds_feed = OddsFeedClient::new(&config.odds_api_url);
    let gateway: Arc<dyn IpatGateway> = Arc::new(HttpIpatGateway::new(&config.gateway_api_url));
    let credentials: Arc<dyn CredentialsProvider> = Arc::new(EnvCredentialsProvider);

    let executor = BetExecutor::new(
        predictions,
        orders,
        odds_feed,
        gateway,
        credentials,
        user_id,
        config.bankroll_yen,
    );

    match executor.run(&args.race_id).await {
        Ok(ExecutorOutcome::InsufficientSources) => {
            info!(race_id = %args.race_id, "skipped: fewer than 2 prediction sources available");
        }
        Ok(ExecutorOutcome::Completed { order, bet_count, .. }) => {
            info!(
                race_id = %args.race_id,
                order_id = %order.order_id,
                bet_count,
                total_amount = order.total_amount,
                "order completed"
            );
        }
        Err(e) => {
            anyhow::bail!("bet executor run failed for {}: {e}", args.race_id);
        }
    }

    Ok(())
}
