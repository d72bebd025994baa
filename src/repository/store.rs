//! SQLite Store
//!
//! SQLite-backed implementation of all store operations.
//! Specialized operations are in separate modules:
//! - list: list CRUD and positioning
//! - task: task CRUD, toggling and positioning
//! - settings_repo: key-value settings

use std::sync::Arc;

use async_trait::async_trait;

use super::db::DbState;
use super::local_storage::{LocalStorage, MemoryStorage};
use super::traits::TaskStore;
use crate::domain::DomainResult;

/// Store over one lazily opened database
#[derive(Clone)]
pub struct SqliteStore {
    pub(super) state: Arc<DbState>,
}

impl SqliteStore {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self {
            state: Arc::new(DbState::new(storage)),
        }
    }

    /// Store whose image only lives in memory
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn storage(&self) -> &Arc<dyn LocalStorage> {
        self.state.storage()
    }

    pub async fn is_open(&self) -> bool {
        self.state.is_open().await
    }
}

#[async_trait]
impl TaskStore for SqliteStore {
    async fn initialize(&self) -> DomainResult<()> {
        self.state.initialize().await
    }
}
