//! Task Repository - Core CRUD Operations

use async_trait::async_trait;
use log::debug;
use rusqlite::{params, Row};

use super::task_positioning::next_task_order;
use crate::domain::{DomainResult, Priority, Task};
use crate::repository::db::{now_timestamp, timestamp_at};
use crate::repository::store::SqliteStore;
use crate::repository::traits::TaskOperations;

pub(crate) const TASK_COLUMNS: &str =
    "id, title, description, completed, priority, created_at, order_idx";

/// Convert a database row (selected with `TASK_COLUMNS`) to Task
pub(crate) fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        completed: row.get::<_, i64>(3)? != 0,
        priority: Priority::from_str(&row.get::<_, String>(4)?),
        created_at: timestamp_at(row, 5)?,
        order: row.get(6)?,
    })
}

#[async_trait]
impl TaskOperations for SqliteStore {
    async fn create_task(
        &self,
        list_id: &str,
        title: &str,
        description: &str,
        priority: Priority,
    ) -> DomainResult<String> {
        self.state
            .write(|db| {
                let order = next_task_order(db.conn(), list_id)?;
                let id = db.next_id()?;
                db.conn().execute(
                    "INSERT INTO tasks (id, list_id, title, description, completed, priority, created_at, order_idx) VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7)",
                    params![id, list_id, title, description, priority.as_str(), now_timestamp(), order],
                )?;
                debug!("Created task {} in list {} at order {}", id, list_id, order);
                Ok(id)
            })
            .await
    }

    async fn update_task(
        &self,
        id: &str,
        title: &str,
        description: &str,
        priority: Priority,
    ) -> DomainResult<()> {
        self.state
            .write(|db| {
                db.conn().execute(
                    "UPDATE tasks SET title = ?1, description = ?2, priority = ?3 WHERE id = ?4",
                    params![title, description, priority.as_str(), id],
                )?;
                Ok(())
            })
            .await
    }

    async fn toggle_task(&self, id: &str) -> DomainResult<()> {
        self.state
            .write(|db| {
                db.conn().execute(
                    "UPDATE tasks SET completed = NOT completed WHERE id = ?1",
                    params![id],
                )?;
                Ok(())
            })
            .await
    }

    async fn delete_task(&self, id: &str) -> DomainResult<()> {
        self.state
            .write(|db| {
                db.conn()
                    .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
                Ok(())
            })
            .await
    }
}
