//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for data access.
//! The manager only sees `TaskStore`, so tests and alternative backends can
//! be injected in place of the SQLite store.

use async_trait::async_trait;

use super::list::ListPositioningOperations;
use super::task::TaskPositioningOperations;
use crate::domain::{DomainResult, Priority, Settings, SettingsPatch, TaskList};

/// List CRUD
#[async_trait]
pub trait ListOperations: Send + Sync {
    /// All lists with their tasks, in display order
    async fn list_all(&self) -> DomainResult<Vec<TaskList>>;

    /// Create a list at the end; returns its id
    async fn create_list(&self, title: &str, description: &str) -> DomainResult<String>;

    /// Update title and description. Unknown ids are ignored.
    async fn update_list(&self, id: &str, title: &str, description: &str) -> DomainResult<()>;

    /// Delete a list together with its tasks. Unknown ids are ignored.
    async fn delete_list(&self, id: &str) -> DomainResult<()>;
}

/// Task CRUD
#[async_trait]
pub trait TaskOperations: Send + Sync {
    /// Create a task at the end of its list; returns its id
    async fn create_task(
        &self,
        list_id: &str,
        title: &str,
        description: &str,
        priority: Priority,
    ) -> DomainResult<String>;

    async fn update_task(
        &self,
        id: &str,
        title: &str,
        description: &str,
        priority: Priority,
    ) -> DomainResult<()>;

    /// Flip the stored completion flag
    async fn toggle_task(&self, id: &str) -> DomainResult<()>;

    async fn delete_task(&self, id: &str) -> DomainResult<()>;
}

#[async_trait]
pub trait SettingsOperations: Send + Sync {
    async fn get_settings(&self) -> DomainResult<Settings>;

    /// Upsert every provided key
    async fn set_settings(&self, patch: &SettingsPatch) -> DomainResult<()>;
}

/// Everything the task manager needs from storage
#[async_trait]
pub trait TaskStore:
    ListOperations
    + ListPositioningOperations
    + TaskOperations
    + TaskPositioningOperations
    + SettingsOperations
{
    /// Open (and migrate) the database if it is not open yet
    async fn initialize(&self) -> DomainResult<()>;
}
