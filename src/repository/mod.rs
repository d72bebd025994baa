//! Repository Layer
//!
//! Data access abstractions and the SQLite implementation.

mod db;
mod list;
mod local_storage;
pub mod migrations;
mod settings_repo;
mod store;
mod task;
mod traits;


pub use db::{init_db, Database, DbState, DB_KEY};
pub use list::ListPositioningOperations;
pub use local_storage::{FileStorage, LocalStorage, MemoryStorage};
pub use store::SqliteStore;
pub use task::TaskPositioningOperations;
pub use traits::{ListOperations, SettingsOperations, TaskOperations, TaskStore};
