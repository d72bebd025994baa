//! Task Positioning Operations
//!
//! Operations for managing task order within the owning list.

use async_trait::async_trait;
use log::debug;
use rusqlite::{params, Connection};

use crate::domain::DomainResult;
use crate::repository::store::SqliteStore;

/// Trait for task positioning operations
#[async_trait]
pub trait TaskPositioningOperations: Send + Sync {
    /// Order a new task in `list_id` would get
    async fn next_task_order(&self, list_id: &str) -> DomainResult<i64>;

    /// Overwrite the order of one task
    async fn set_task_order(&self, id: &str, order: i64) -> DomainResult<()>;
}

/// 1 + the current maximum within the list, 1 for an empty list
pub(crate) fn next_task_order(conn: &Connection, list_id: &str) -> DomainResult<i64> {
    Ok(conn.query_row(
        "SELECT COALESCE(MAX(order_idx), 0) + 1 FROM tasks WHERE list_id = ?1",
        params![list_id],
        |row| row.get(0),
    )?)
}

#[async_trait]
impl TaskPositioningOperations for SqliteStore {
    async fn next_task_order(&self, list_id: &str) -> DomainResult<i64> {
        self.state.read(|db| next_task_order(db.conn(), list_id)).await
    }

    async fn set_task_order(&self, id: &str, order: i64) -> DomainResult<()> {
        self.state
            .write(|db| {
                db.conn().execute(
                    "UPDATE tasks SET order_idx = ?1 WHERE id = ?2",
                    params![order, id],
                )?;
                debug!("Task {} moved to order {}", id, order);
                Ok(())
            })
            .await
    }
}
