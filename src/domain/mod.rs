//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has NO storage dependencies (only serde, chrono and thiserror).

mod entity;
mod list;
mod settings;
mod task;

pub use entity::{DomainError, DomainResult, Entity};
pub use list::{CompletionStats, TaskList};
pub use settings::{Settings, SettingsPatch, ThemeColor, DEFAULT_THEME_COLOR};
pub use task::{Priority, Task};
