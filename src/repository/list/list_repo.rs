//! List Repository - Core CRUD Operations

use async_trait::async_trait;
use log::debug;
use rusqlite::{params, Row};

use super::list_positioning::next_list_order;
use crate::domain::{DomainResult, TaskList};
use crate::repository::db::{now_timestamp, timestamp_at};
use crate::repository::store::SqliteStore;
use crate::repository::task::{row_to_task, TASK_COLUMNS};
use crate::repository::traits::ListOperations;

const LIST_COLUMNS: &str = "id, title, description, created_at, order_idx";

/// Convert a database row to a TaskList without its tasks
fn row_to_list(row: &Row<'_>) -> rusqlite::Result<TaskList> {
    Ok(TaskList {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        tasks: Vec::new(),
        created_at: timestamp_at(row, 3)?,
        order: row.get(4)?,
    })
}

#[async_trait]
impl ListOperations for SqliteStore {
    async fn list_all(&self) -> DomainResult<Vec<TaskList>> {
        self.state
            .read(|db| {
                let conn = db.conn();

                // Newest first among lists sharing an order, oldest first among tasks
                let mut list_stmt = conn.prepare(&format!(
                    "SELECT {} FROM lists ORDER BY order_idx ASC, created_at DESC, id DESC",
                    LIST_COLUMNS
                ))?;
                let mut lists = list_stmt
                    .query_map([], row_to_list)?
                    .collect::<Result<Vec<_>, _>>()?;

                let mut task_stmt = conn.prepare(&format!(
                    "SELECT {} FROM tasks WHERE list_id = ?1 ORDER BY order_idx ASC, created_at ASC, id ASC",
                    TASK_COLUMNS
                ))?;
                for list in &mut lists {
                    list.tasks = task_stmt
                        .query_map(params![list.id], row_to_task)?
                        .collect::<Result<Vec<_>, _>>()?;
                }
                Ok(lists)
            })
            .await
    }

    async fn create_list(&self, title: &str, description: &str) -> DomainResult<String> {
        self.state
            .write(|db| {
                let order = next_list_order(db.conn())?;
                let id = db.next_id()?;
                db.conn().execute(
                    "INSERT INTO lists (id, title, description, created_at, order_idx) VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![id, title, description, now_timestamp(), order],
                )?;
                debug!("Created list {} at order {}", id, order);
                Ok(id)
            })
            .await
    }

    async fn update_list(&self, id: &str, title: &str, description: &str) -> DomainResult<()> {
        self.state
            .write(|db| {
                db.conn().execute(
                    "UPDATE lists SET title = ?1, description = ?2 WHERE id = ?3",
                    params![title, description, id],
                )?;
                Ok(())
            })
            .await
    }

    async fn delete_list(&self, id: &str) -> DomainResult<()> {
        self.state
            .write(|db| {
                // Tasks go first so images without the FK clause cascade too
                let tx = db.conn().unchecked_transaction()?;
                let tasks = tx.execute("DELETE FROM tasks WHERE list_id = ?1", params![id])?;
                tx.execute("DELETE FROM lists WHERE id = ?1", params![id])?;
                tx.commit()?;
                debug!("Deleted list {} with {} tasks", id, tasks);
                Ok(())
            })
            .await
    }
}
