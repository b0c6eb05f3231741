//! AutoBetOrchestrator: ticks on an interval, finds races whose post time
//! falls inside the look-ahead window, and schedules the executor to fire
//! `fire_lead_minutes` before post. At-most-once per race is enforced by
//! `ScheduleStore::create_schedule`'s idempotent-by-name insert — the
//! orchestrator does not itself track which races it has seen.

use crate::executor::BetExecutor;
use crate::race_calendar::RaceCalendarClient;
use crate::scheduler::{schedule_name, ScheduleStore};
use anyhow::Result;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct AutoBetOrchestrator {
    calendar: RaceCalendarClient,
    schedule_store: Arc<dyn ScheduleStore>,
    executor: Arc<BetExecutor>,
    window_start_minutes: i64,
    window_minutes: i64,
    fire_lead_minutes: i64,
}

impl AutoBetOrchestrator {
    pub fn new(
        calendar: RaceCalendarClient,
        schedule_store: Arc<dyn ScheduleStore>,
        executor: Arc<BetExecutor>,
        window_start_minutes: i64,
        window_minutes: i64,
        fire_lead_minutes: i64,
    ) -> Self {
        Self {
            calendar,
            schedule_store,
            executor,
            window_start_minutes,
            window_minutes,
            fire_lead_minutes,
        }
    }

    /// One orchestrator cycle: pull today's calendar, schedule any race
    /// whose post time falls in the look-ahead window, then fire and
    /// clear whatever schedules are now due. Intended to be called on a
    /// fixed interval from `main.rs`.
    pub async fn tick(&self) -> Result<()> {
        self.schedule_upcoming_races().await?;
        self.fire_due_schedules().await;
        Ok(())
    }

    async fn schedule_upcoming_races(&self) -> Result<()> {
        let entries = self.calendar.fetch_today().await?;
        let now = Utc::now();
        let window_open = now + Duration::minutes(self.window_start_minutes);
        let window_close = now + Duration::minutes(self.window_start_minutes + self.window_minutes);

        for entry in entries {
            if entry.post_time < window_open || entry.post_time > window_close {
                continue;
            }
            let fire_time = entry.post_time - Duration::minutes(self.fire_lead_minutes);
            let name = schedule_name(&entry.race_id);
            self.schedule_store
                .create_schedule(&name, fire_time, &entry.race_id)
                .await?;
            info!(race_id = %entry.race_id, fire_time = %fire_time, "race scheduled");
        }
        Ok(())
    }

    async fn fire_due_schedules(&self) {
        let due = match self.schedule_store.due_schedules(Utc::now()).await {
            Ok(due) => due,
            Err(e) => {
                error!(error = %e, "failed to query due schedules");
                return;
            }
        };

        for schedule in due {
            info!(race_id = %schedule.race_id, "firing scheduled executor run");
            match self.executor.run(&schedule.race_id).await {
                Ok(outcome) => info!(race_id = %schedule.race_id, outcome = ?outcome, "executor run finished"),
                Err(e) => warn!(race_id = %schedule.race_id, error = %e, "executor run failed"),
            }

            if let Err(e) = self.schedule_store.delete_schedule(&schedule.name).await {
                error!(name = %schedule.name, error = %e, "failed to delete fired schedule");
            }
        }
    }
}
