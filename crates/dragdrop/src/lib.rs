//! DragDrop Utilities
//!
//! Framework-agnostic drag-and-drop bookkeeping for ordered views.
//! The view layer forwards its pointer/drag events here; this crate only
//! tracks which item is being dragged, which item is under it, and what the
//! resulting order is once the item is dropped.

/// Drag gesture state
///
/// `Idle -> Dragging -> Targeting -> Idle`, with a drop from `Targeting`
/// producing a new order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragState<Id> {
    /// Nothing is being dragged
    Idle,
    /// An item is being dragged but is not over another item
    Dragging { source: Id },
    /// An item is being dragged over another item
    Targeting { source: Id, target: Id },
}

impl<Id> Default for DragState<Id> {
    fn default() -> Self {
        DragState::Idle
    }
}

impl<Id: Clone + PartialEq> DragState<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start dragging an item. Any previous gesture is discarded.
    pub fn start(&mut self, source: Id) {
        *self = DragState::Dragging { source };
    }

    /// Pointer entered another item while dragging
    pub fn enter(&mut self, target: Id) {
        let Some(source) = self.source().cloned() else {
            return;
        };
        // Don't allow dropping on self
        *self = if source == target {
            DragState::Dragging { source }
        } else {
            DragState::Targeting { source, target }
        };
    }

    /// Pointer left the current target. Only the target is cleared.
    pub fn leave(&mut self) {
        if let DragState::Targeting { source, .. } = self {
            *self = DragState::Dragging {
                source: source.clone(),
            };
        }
    }

    /// Gesture ended without a drop (cancelled or released outside a target)
    pub fn end(&mut self) {
        *self = DragState::Idle;
    }

    /// Release the dragged item over the current target.
    ///
    /// Always resets to `Idle`. Returns the new order of `items` when a
    /// target is active and both ids are present in `items`.
    pub fn release(&mut self, items: &[Id]) -> Option<Vec<Id>> {
        let previous = std::mem::take(self);
        match previous {
            DragState::Targeting { source, target } => move_before(items, &source, &target),
            _ => None,
        }
    }

    pub fn source(&self) -> Option<&Id> {
        match self {
            DragState::Idle => None,
            DragState::Dragging { source } | DragState::Targeting { source, .. } => Some(source),
        }
    }

    pub fn target(&self) -> Option<&Id> {
        match self {
            DragState::Targeting { target, .. } => Some(target),
            _ => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        !matches!(self, DragState::Idle)
    }
}

/// Move `source` into the slot currently held by `target`.
///
/// The source is removed first and reinserted at the index the target had
/// before removal, so dragging upwards lands the item just before the target
/// and dragging downwards lands it just after.
/// Returns `None` when `source == target` or either id is missing.
pub fn move_before<Id: Clone + PartialEq>(items: &[Id], source: &Id, target: &Id) -> Option<Vec<Id>> {
    if source == target {
        return None;
    }
    let from = items.iter().position(|id| id == source)?;
    let to = items.iter().position(|id| id == target)?;

    let mut reordered = items.to_vec();
    let moved = reordered.remove(from);
    reordered.insert(to, moved);
    Some(reordered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(v: &[&'static str]) -> Vec<&'static str> {
        v.to_vec()
    }

    #[test]
    fn test_move_last_before_first() {
        let items = ids(&["a", "b", "c"]);
        assert_eq!(move_before(&items, &"c", &"a"), Some(ids(&["c", "a", "b"])));
    }

    #[test]
    fn test_move_first_onto_last_takes_its_slot() {
        let items = ids(&["a", "b", "c"]);
        assert_eq!(move_before(&items, &"a", &"c"), Some(ids(&["b", "c", "a"])));
    }

    #[test]
    fn test_move_onto_self_or_missing() {
        let items = ids(&["a", "b"]);
        assert_eq!(move_before(&items, &"a", &"a"), None);
        assert_eq!(move_before(&items, &"x", &"a"), None);
        assert_eq!(move_before(&items, &"a", &"x"), None);
    }

    #[test]
    fn test_full_gesture_emits_order() {
        let items = ids(&["a", "b", "c"]);
        let mut state = DragState::new();

        state.start("c");
        assert_eq!(state, DragState::Dragging { source: "c" });

        state.enter("a");
        assert_eq!(state.target(), Some(&"a"));

        let order = state.release(&items);
        assert_eq!(order, Some(ids(&["c", "a", "b"])));
        assert_eq!(state, DragState::Idle);
    }

    #[test]
    fn test_release_without_target_is_noop() {
        let items = ids(&["a", "b"]);
        let mut state = DragState::new();

        state.start("a");
        assert_eq!(state.release(&items), None);
        assert!(!state.is_dragging());

        // Released while idle
        assert_eq!(state.release(&items), None);
    }

    #[test]
    fn test_enter_self_does_not_target() {
        let mut state = DragState::new();
        state.start("a");
        state.enter("b");
        state.enter("a");
        assert_eq!(state, DragState::Dragging { source: "a" });
    }

    #[test]
    fn test_leave_clears_target_only() {
        let mut state = DragState::new();
        state.start("a");
        state.enter("b");
        state.leave();
        assert_eq!(state, DragState::Dragging { source: "a" });
        assert_eq!(state.source(), Some(&"a"));
    }

    #[test]
    fn test_enter_while_idle_is_ignored() {
        let mut state: DragState<&str> = DragState::new();
        state.enter("a");
        assert_eq!(state, DragState::Idle);
    }

    #[test]
    fn test_end_resets() {
        let mut state = DragState::new();
        state.start(1u32);
        state.enter(2);
        state.end();
        assert_eq!(state, DragState::Idle);
        assert_eq!(state.target(), None);
    }
}
