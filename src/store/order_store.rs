use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::{IpatBetLine, OrderStatus, PurchaseOrder};

/// Persisted purchase orders. Primary key `order_id`; secondary access by
/// `user_id`. Writes must be durable before the caller proceeds — the
/// order record must outlive an executor crash.
#[derive(Clone)]
pub struct OrderStore {
    conn: Arc<Mutex<Connection>>,
}

impl OrderStore {
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).context("open order store")?;
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "synchronous", "FULL").ok();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS orders (
                order_id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                race_id TEXT NOT NULL,
                bet_lines_json TEXT NOT NULL,
                total_amount INTEGER NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                error_message TEXT
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_orders_user_id ON orders(user_id)",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Inserts a brand-new order (status must be `Pending`), or persists a
    /// state transition for an existing one. Either way this is a full
    /// upsert of the row — every state change is written in full.
    pub async fn save(&self, order: &PurchaseOrder) -> Result<()> {
        let bet_lines_json = serde_json::to_string(&order.bet_lines)?;
        let status_str = status_to_str(order.status);
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO orders \
             (order_id, user_id, race_id, bet_lines_json, total_amount, status, created_at, updated_at, error_message) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
             ON CONFLICT(order_id) DO UPDATE SET \
                status = excluded.status, \
                updated_at = excluded.updated_at, \
                error_message = excluded.error_message",
            params![
                &order.order_id,
                &order.user_id,
                &order.race_id,
                &bet_lines_json,
                order.total_amount,
                status_str,
                order.created_at.to_rfc3339(),
                order.updated_at.to_rfc3339(),
                order.error_message.as_deref(),
            ],
        )?;
        Ok(())
    }

    pub async fn get(&self, order_id: &str) -> Result<Option<PurchaseOrder>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(
            "SELECT order_id, user_id, race_id, bet_lines_json, total_amount, status, \
                    created_at, updated_at, error_message \
             FROM orders WHERE order_id = ?1",
        )?;
        let mut rows = stmt.query(params![order_id])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        Ok(Some(row_to_order(row)?))
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<PurchaseOrder>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(
            "SELECT order_id, user_id, race_id, bet_lines_json, total_amount, status, \
                    created_at, updated_at, error_message \
             FROM orders WHERE user_id = ?1 ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| Ok(row_to_owned(row)))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row_to_order_owned(row?)?);
        }
        Ok(out)
    }
}

type OwnedRow = (
    String,
    String,
    String,
    String,
    i64,
    String,
    String,
    String,
    Option<String>,
);

fn row_to_owned(row: &rusqlite::Row<'_>) -> OwnedRow {
    (
        row.get_unwrap(0),
        row.get_unwrap(1),
        row.get_unwrap(2),
        row.get_unwrap(3),
        row.get_unwrap(4),
        row.get_unwrap(5),
        row.get_unwrap(6),
        row.get_unwrap(7),
        row.get_unwrap(8),
    )
}

fn row_to_order(row: &rusqlite::Row<'_>) -> Result<PurchaseOrder> {
    row_to_order_owned(row_to_owned(row))
}

fn row_to_order_owned(row: OwnedRow) -> Result<PurchaseOrder> {
    let (order_id, user_id, race_id, bet_lines_json, total_amount, status, created_at, updated_at, error_message) = row;
    let bet_lines: Vec<IpatBetLine> = serde_json::from_str(&bet_lines_json)?;
    let status = status_from_str(&status)?;
    let created_at = chrono::DateTime::parse_from_rfc3339(&created_at)
        .context("corrupt created_at timestamp")?
        .with_timezone(&chrono::Utc);
    let updated_at = chrono::DateTime::parse_from_rfc3339(&updated_at)
        .context("corrupt updated_at timestamp")?
        .with_timezone(&chrono::Utc);
    Ok(PurchaseOrder {
        order_id,
        user_id,
        race_id,
        bet_lines,
        total_amount,
        status,
        created_at,
        updated_at,
        error_message,
    })
}

fn status_to_str(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "pending",
        OrderStatus::Submitted => "submitted",
        OrderStatus::Completed => "completed",
        OrderStatus::Failed => "failed",
    }
}

fn status_from_str(s: &str) -> Result<OrderStatus> {
    match s {
        "pending" => Ok(OrderStatus::Pending),
        "submitted" => Ok(OrderStatus::Submitted),
        "completed" => Ok(OrderStatus::Completed),
        "failed" => Ok(OrderStatus::Failed),
        other => anyhow::bail!("unknown order status in store: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BetType;

    fn sample_order() -> PurchaseOrder {
        let lines = vec![IpatBetLine {
            opdt: "20260208".to_string(),
            venue_code: "08".to_string(),
            race_number: 11,
            bet_type: BetType::Win,
            number: "03".to_string(),
            amount: 400,
        }];
        PurchaseOrder::new("user-1", "20260208_08_11", lines)
    }

    #[tokio::test]
    async fn save_then_get_round_trips() {
        let store = OrderStore::new(":memory:").unwrap();
        let order = sample_order();
        store.save(&order).await.unwrap();

        let found = store.get(&order.order_id).await.unwrap().unwrap();
        assert_eq!(found.status, OrderStatus::Pending);
        assert_eq!(found.total_amount, 400);
    }

    #[tokio::test]
    async fn state_transition_overwrites_status() {
        let store = OrderStore::new(":memory:").unwrap();
        let mut order = sample_order();
        store.save(&order).await.unwrap();

        order.status = OrderStatus::Submitted;
        store.save(&order).await.unwrap();

        order.status = OrderStatus::Failed;
        order.error_message = Some("gateway returned ret=1".to_string());
        store.save(&order).await.unwrap();

        let found = store.get(&order.order_id).await.unwrap().unwrap();
        assert_eq!(found.status, OrderStatus::Failed);
        assert_eq!(found.error_message.as_deref(), Some("gateway returned ret=1"));
    }

    #[tokio::test]
    async fn list_for_user_filters_by_user_id() {
        let store = OrderStore::new(":memory:").unwrap();
        store.save(&sample_order()).await.unwrap();
        let mut other = sample_order();
        other.user_id = "user-2".to_string();
        store.save(&other).await.unwrap();

        let found = store.list_for_user("user-1").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].user_id, "user-1");
    }
}
