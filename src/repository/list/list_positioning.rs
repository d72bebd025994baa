//! List Positioning Operations
//!
//! Operations for managing list order among all lists.

use async_trait::async_trait;
use log::debug;
use rusqlite::{params, Connection};

use crate::domain::DomainResult;
use crate::repository::store::SqliteStore;

/// Trait for list positioning operations
#[async_trait]
pub trait ListPositioningOperations: Send + Sync {
    /// Order a newly created list would get
    async fn next_list_order(&self) -> DomainResult<i64>;

    /// Overwrite the order of one list
    async fn set_list_order(&self, id: &str, order: i64) -> DomainResult<()>;
}

/// 1 + the current maximum, 1 when there are no lists
pub(crate) fn next_list_order(conn: &Connection) -> DomainResult<i64> {
    Ok(conn.query_row("SELECT COALESCE(MAX(order_idx), 0) + 1 FROM lists", [], |row| {
        row.get(0)
    })?)
}

#[async_trait]
impl ListPositioningOperations for SqliteStore {
    async fn next_list_order(&self) -> DomainResult<i64> {
        self.state.read(|db| next_list_order(db.conn())).await
    }

    async fn set_list_order(&self, id: &str, order: i64) -> DomainResult<()> {
        self.state
            .write(|db| {
                db.conn().execute(
                    "UPDATE lists SET order_idx = ?1 WHERE id = ?2",
                    params![order, id],
                )?;
                debug!("List {} moved to order {}", id, order);
                Ok(())
            })
            .await
    }
}
