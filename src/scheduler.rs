//! Schedule store: the external scheduling subsystem the orchestrator
//! leans on for at-most-once firing.
//! Three operations, idempotent-by-name creation, fire-exactly-once
//! semantics left to the caller (the orchestrator polls `due` schedules
//! and deletes them after firing — see `orchestrator.rs`).

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub name: String,
    pub fire_time: DateTime<Utc>,
    pub race_id: String,
}

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Idempotent on name collision: a duplicate create is a no-op success.
    async fn create_schedule(&self, name: &str, fire_time: DateTime<Utc>, race_id: &str) -> Result<()>;
    async fn get_schedule(&self, name: &str) -> Result<Option<Schedule>>;
    async fn delete_schedule(&self, name: &str) -> Result<()>;
    /// Schedules whose `fire_time` has passed and are still present.
    async fn due_schedules(&self, now: DateTime<Utc>) -> Result<Vec<Schedule>>;
}

#[derive(Clone)]
pub struct SqliteScheduleStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteScheduleStore {
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).context("open schedule store")?;
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "synchronous", "NORMAL").ok();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS schedules (
                name TEXT PRIMARY KEY,
                fire_time TEXT NOT NULL,
                race_id TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

#[async_trait]
impl ScheduleStore for SqliteScheduleStore {
    async fn create_schedule(&self, name: &str, fire_time: DateTime<Utc>, race_id: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO schedules (name, fire_time, race_id) VALUES (?1, ?2, ?3) \
             ON CONFLICT(name) DO NOTHING",
            params![name, fire_time.to_rfc3339(), race_id],
        )?;
        Ok(())
    }

    async fn get_schedule(&self, name: &str) -> Result<Option<Schedule>> {
        let conn = self.conn.lock().await;
        let mut stmt =
            conn.prepare_cached("SELECT name, fire_time, race_id FROM schedules WHERE name = ?1")?;
        let mut rows = stmt.query(params![name])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let name: String = row.get(0)?;
        let fire_time: String = row.get(1)?;
        let race_id: String = row.get(2)?;
        let fire_time = DateTime::parse_from_rfc3339(&fire_time)
            .context("corrupt fire_time")?
            .with_timezone(&Utc);
        Ok(Some(Schedule {
            name,
            fire_time,
            race_id,
        }))
    }

    async fn delete_schedule(&self, name: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM schedules WHERE name = ?1", params![name])?;
        Ok(())
    }

    async fn due_schedules(&self, now: DateTime<Utc>) -> Result<Vec<Schedule>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(
            "SELECT name, fire_time, race_id FROM schedules WHERE fire_time <= ?1",
        )?;
        let rows = stmt.query_map(params![now.to_rfc3339()], |row| {
            let name: String = row.get(0)?;
            let fire_time: String = row.get(1)?;
            let race_id: String = row.get(2)?;
            Ok((name, fire_time, race_id))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (name, fire_time, race_id) = row?;
            let fire_time = DateTime::parse_from_rfc3339(&fire_time)
                .context("corrupt fire_time")?
                .with_timezone(&Utc);
            out.push(Schedule {
                name,
                fire_time,
                race_id,
            });
        }
        Ok(out)
    }
}

/// The name a schedule gets for a given race.
pub fn schedule_name(race_id: &str) -> String {
    format!("auto-bet-{race_id}")
}
