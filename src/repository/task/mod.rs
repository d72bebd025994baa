//! Task Repository Module
//!
//! - task_repo: Core CRUD operations and completion toggling
//! - task_positioning: Order management within a list

mod task_positioning;
mod task_repo;

pub use task_positioning::TaskPositioningOperations;
pub(crate) use task_repo::{row_to_task, TASK_COLUMNS};
