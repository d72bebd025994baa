//! Task Lists
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - repository: SQLite image persisted through local storage
//! - manager: Application state and user-facing operations
//! - reorder: Drag-to-reorder gestures
//! - config: Paths and log level

use std::sync::Arc;

use rolling_logger::LoggerError;

pub mod config;
pub mod domain;
pub mod manager;
pub mod reorder;
pub mod repository;

pub use config::AppConfig;
pub use domain::{DomainError, DomainResult, Priority, Settings, Task, TaskList, ThemeColor};
pub use manager::{ManagerError, TaskManager};
pub use reorder::{ReorderCoordinator, ReorderRequest, ReorderScope};
pub use repository::{FileStorage, LocalStorage, MemoryStorage, SqliteStore, TaskStore};

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Failed to prepare data directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to start logging: {0}")]
    Logger(#[from] LoggerError),
    #[error("Failed to open storage: {0}")]
    Storage(#[from] DomainError),
}

/// Wire logging, storage and the manager for `config`.
///
/// Load failures do not fail the bootstrap; they surface as the manager's
/// initialization error.
pub async fn bootstrap(config: &AppConfig) -> Result<TaskManager, BootstrapError> {
    std::fs::create_dir_all(&config.data_dir)?;

    match rolling_logger::init_logger_with_level(
        config.log_dir.clone(),
        &config.app_name,
        config.log_level,
    ) {
        Ok(()) | Err(LoggerError::AlreadyInitialized) => {}
        Err(LoggerError::Subscriber(reason)) => {
            log::warn!("Another log subscriber is installed: {}", reason);
        }
        Err(e) => return Err(e.into()),
    }

    let storage = FileStorage::open(config.storage_path())?;
    let _ = rolling_logger::info(&format!(
        "Opening workspace at {}",
        storage.path().display()
    ));

    let store = SqliteStore::new(Arc::new(storage));
    let manager = TaskManager::open(Arc::new(store)).await;

    match manager.error() {
        Some(err) => {
            let _ = rolling_logger::error(&format!("Workspace load failed: {:?}", err));
        }
        None => {
            let _ = rolling_logger::info(&format!(
                "Workspace ready with {} lists",
                manager.all_lists().len()
            ));
        }
    }

    Ok(manager)
}
