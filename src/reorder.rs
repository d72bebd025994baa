//! Drag-to-reorder glue
//!
//! Tracks one drag gesture over either the list view or a task view and
//! turns a successful drop into a `ReorderRequest` for the manager.

use dragdrop::DragState;
use log::debug;

use crate::domain::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderScope {
    Lists,
    Tasks,
}

/// Full new order of the dragged scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderRequest {
    Lists(Vec<String>),
    Tasks(Vec<String>),
}

impl ReorderRequest {
    pub fn scope(&self) -> ReorderScope {
        match self {
            ReorderRequest::Lists(_) => ReorderScope::Lists,
            ReorderRequest::Tasks(_) => ReorderScope::Tasks,
        }
    }

    pub fn ids(&self) -> &[String] {
        match self {
            ReorderRequest::Lists(ids) | ReorderRequest::Tasks(ids) => ids,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReorderCoordinator {
    scope: ReorderScope,
    drag: DragState<String>,
}

impl ReorderCoordinator {
    pub fn new(scope: ReorderScope) -> Self {
        Self {
            scope,
            drag: DragState::new(),
        }
    }

    pub fn lists() -> Self {
        Self::new(ReorderScope::Lists)
    }

    pub fn tasks() -> Self {
        Self::new(ReorderScope::Tasks)
    }

    pub fn scope(&self) -> ReorderScope {
        self.scope
    }

    pub fn drag_start(&mut self, id: impl Into<String>) {
        let id = id.into();
        debug!("Drag start {:?} {}", self.scope, id);
        self.drag.start(id);
    }

    pub fn drag_over(&mut self, id: impl Into<String>) {
        self.drag.enter(id.into());
    }

    pub fn drag_leave(&mut self) {
        self.drag.leave();
    }

    pub fn drag_end(&mut self) {
        self.drag.end();
    }

    pub fn state(&self) -> &DragState<String> {
        &self.drag
    }

    pub fn dragged_id(&self) -> Option<&str> {
        self.drag.source().map(String::as_str)
    }

    /// Current drop target, for highlighting
    pub fn target_id(&self) -> Option<&str> {
        self.drag.target().map(String::as_str)
    }

    /// Drop onto the current target.
    ///
    /// `items` is the visible sequence in display order. Returns `None`
    /// (and still ends the gesture) when there is nothing to reorder.
    pub fn release<'a, T, I>(&mut self, items: I) -> Option<ReorderRequest>
    where
        T: Entity<Id = String> + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let ids: Vec<String> = items.into_iter().map(|item| item.id()).collect();
        let reordered = self.drag.release(&ids)?;
        debug!("Drop {:?}: {:?}", self.scope, reordered);
        Some(match self.scope {
            ReorderScope::Lists => ReorderRequest::Lists(reordered),
            ReorderScope::Tasks => ReorderRequest::Tasks(reordered),
        })
    }
}
