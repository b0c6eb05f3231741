//! Application configuration, loaded from environment variables, using the
//! `env::var(..).ok().and_then(|v| v.parse().ok()).unwrap_or(default)` idiom
//! throughout.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// Win-bet Kelly sizing base (yen).
    pub bankroll_yen: i64,
    /// Base URL of the market odds feed.
    pub odds_api_url: String,
    /// Base URL of the pari-mutuel gateway.
    pub gateway_api_url: String,
    /// Base URL of the race calendar feed.
    pub race_calendar_api_url: String,
    /// User account whose credentials drive auto-betting.
    pub target_user_id: String,
    /// Minutes before post time to fire the executor.
    pub fire_lead_minutes: i64,
    /// Look-ahead window per orchestrator tick, in minutes.
    pub orch_window_minutes: i64,
    /// Minutes from now at which the look-ahead window opens (usually 0).
    pub orch_window_start_minutes: i64,
    pub predictions_db_path: String,
    pub orders_db_path: String,
    pub schedule_db_path: String,
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let target_user_id = env_string("TARGET_USER_ID", "");
        if target_user_id.is_empty() {
            anyhow::bail!("TARGET_USER_ID environment variable is required");
        }

        Ok(Self {
            bankroll_yen: env_parsed("BANKROLL_YEN", 100_000),
            odds_api_url: env_string("ODDS_API_URL", "http://localhost:8000"),
            gateway_api_url: env_string("GATEWAY_API_URL", "http://localhost:8001"),
            race_calendar_api_url: env_string("RACE_CALENDAR_API_URL", "http://localhost:8002"),
            target_user_id,
            fire_lead_minutes: env_parsed("FIRE_LEAD_MINUTES", 5),
            orch_window_minutes: env_parsed("ORCH_WINDOW_MINUTES", 20),
            orch_window_start_minutes: env_parsed("ORCH_WINDOW_START_MINUTES", 0),
            predictions_db_path: env_string("PREDICTIONS_DB_PATH", "predictions.db"),
            orders_db_path: env_string("ORDERS_DB_PATH", "orders.db"),
            schedule_db_path: env_string("SCHEDULE_DB_PATH", "schedule.db"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_env_absent() {
        std::env::remove_var("BANKROLL_YEN");
        assert_eq!(env_parsed::<i64>("BANKROLL_YEN_UNSET_XYZ", 100_000), 100_000);
    }
}
