//! List Repository Module
//!
//! - list_repo: Core CRUD operations
//! - list_positioning: Order management

mod list_positioning;
mod list_repo;

pub use list_positioning::ListPositioningOperations;
