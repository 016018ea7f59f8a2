/*
 * State machine that turns a row drag gesture into a reorder of the section
 * collection. A session starts with `drag_start`, may see any number of
 * `drag_over`/`drag_leave` calls, and is closed by `drop` and/or `drag_end`.
 * `drag_end` is accepted in every state and always returns to `Idle`, so a
 * gesture released outside any row still closes the session.
 *
 * The source index captured at `drag_start` can go stale: a remove click may
 * shorten the collection while the pointer is still down. `drop` therefore
 * checks both indices against the current length before touching the list.
 */
use crate::core::section_collection::SectionCollection;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        source_index: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Reordered { from: usize, to: usize },
    // The session ended without a mutation (same row, or a stale index).
    Unchanged,
    // No session was active.
    Ignored,
}

impl DropOutcome {
    pub fn needs_render(&self) -> bool {
        !matches!(self, DropOutcome::Ignored)
    }
}

#[derive(Debug, Default)]
pub struct DragReorderController {
    state: DragState,
    drop_candidates: BTreeSet<usize>,
}

impl DragReorderController {
    pub fn new() -> Self {
        DragReorderController::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    // Row currently marked as the drag source, if any.
    pub fn active_source(&self) -> Option<usize> {
        match self.state {
            DragState::Dragging { source_index } => Some(source_index),
            DragState::Idle => None,
        }
    }

    pub fn drop_candidates(&self) -> impl Iterator<Item = usize> + '_ {
        self.drop_candidates.iter().copied()
    }

    pub fn is_drop_candidate(&self, index: usize) -> bool {
        self.drop_candidates.contains(&index)
    }

    /*
     * Begins a session on row `index`. Indices outside the current collection
     * are ignored. Starting while another session is open replaces it; the
     * platform only ever reports one drag at a time.
     */
    pub fn drag_start(&mut self, index: usize, collection_len: usize) -> bool {
        if index >= collection_len {
            log::debug!("DragReorderController: drag_start({index}) ignored, len {collection_len}");
            return false;
        }
        if let DragState::Dragging { source_index } = self.state {
            log::warn!(
                "DragReorderController: drag_start({index}) while dragging {source_index}; restarting session"
            );
            self.drop_candidates.clear();
        }
        self.state = DragState::Dragging {
            source_index: index,
        };
        log::trace!("DragReorderController: Dragging row {index}");
        true
    }

    /*
     * Marks `target_index` as a drop candidate. Returns true when a session is
     * active, meaning the platform must suppress its default drop handling.
     */
    pub fn drag_over(&mut self, target_index: usize) -> bool {
        if !self.is_dragging() {
            return false;
        }
        self.drop_candidates.insert(target_index);
        true
    }

    pub fn drag_leave(&mut self, target_index: usize) {
        self.drop_candidates.remove(&target_index);
    }

    pub fn drop(&mut self, target_index: usize, collection: &mut SectionCollection) -> DropOutcome {
        let DragState::Dragging { source_index } = self.state else {
            log::debug!("DragReorderController: drop({target_index}) without an active session");
            return DropOutcome::Ignored;
        };
        self.state = DragState::Idle;
        self.drop_candidates.clear();

        let len = collection.len();
        if source_index >= len || target_index >= len {
            log::debug!(
                "DragReorderController: Stale drop {source_index} -> {target_index} (len {len}), nothing moved"
            );
            return DropOutcome::Unchanged;
        }
        if source_index == target_index {
            return DropOutcome::Unchanged;
        }
        if collection.reorder(source_index, target_index) {
            DropOutcome::Reordered {
                from: source_index,
                to: target_index,
            }
        } else {
            DropOutcome::Unchanged
        }
    }

    pub fn drag_end(&mut self) {
        if self.is_dragging() {
            log::trace!("DragReorderController: Session closed by drag_end");
        }
        self.state = DragState::Idle;
        self.drop_candidates.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::file_descriptor::FileDescriptor;

    fn collection_of(items: &[&str]) -> SectionCollection {
        let mut collection = SectionCollection::new();
        collection.add(
            items.iter().map(|n| FileDescriptor::from_bytes(*n, 5, Vec::new())),
            |_| true,
        );
        collection
    }

    fn names(collection: &SectionCollection) -> Vec<String> {
        collection.iter().map(|f| f.name.clone()).collect()
    }

    #[test]
    fn test_drop_on_other_row_reorders_and_returns_to_idle() {
        // Arrange
        let mut collection = collection_of(&["A", "B", "C", "D"]);
        let mut controller = DragReorderController::new();

        // Act
        assert!(controller.drag_start(0, collection.len()));
        assert!(controller.drag_over(2));
        let outcome = controller.drop(2, &mut collection);

        // Assert
        assert_eq!(outcome, DropOutcome::Reordered { from: 0, to: 2 });
        assert_eq!(names(&collection), vec!["B", "C", "A", "D"]);
        assert_eq!(controller.state(), DragState::Idle);
        assert_eq!(controller.drop_candidates().count(), 0);
    }

    #[test]
    fn test_drop_on_source_row_is_unchanged_but_closes_session() {
        let mut collection = collection_of(&["A", "B"]);
        let mut controller = DragReorderController::new();
        controller.drag_start(1, collection.len());

        let outcome = controller.drop(1, &mut collection);

        assert_eq!(outcome, DropOutcome::Unchanged);
        assert!(outcome.needs_render());
        assert_eq!(names(&collection), vec!["A", "B"]);
        assert_eq!(controller.state(), DragState::Idle);
    }

    #[test]
    fn test_drop_with_stale_source_after_remove_is_no_op() {
        let mut collection = collection_of(&["A", "B", "C"]);
        let mut controller = DragReorderController::new();
        controller.drag_start(2, collection.len());

        // A remove click shortens the list mid-gesture.
        collection.remove_at(0);
        let outcome = controller.drop(0, &mut collection);

        assert_eq!(outcome, DropOutcome::Unchanged);
        assert_eq!(names(&collection), vec!["B", "C"]);
        assert!(!controller.is_dragging());
    }

    #[test]
    fn test_drag_over_and_drop_require_session() {
        let mut collection = collection_of(&["A", "B"]);
        let mut controller = DragReorderController::new();

        assert!(!controller.drag_over(1));
        assert!(!controller.is_drop_candidate(1));
        assert_eq!(controller.drop(1, &mut collection), DropOutcome::Ignored);
        assert_eq!(names(&collection), vec!["A", "B"]);
    }

    #[test]
    fn test_drag_start_out_of_range_is_ignored() {
        let mut controller = DragReorderController::new();
        assert!(!controller.drag_start(3, 3));
        assert_eq!(controller.state(), DragState::Idle);
    }

    #[test]
    fn test_drag_end_clears_markers_from_any_state() {
        let mut controller = DragReorderController::new();
        controller.drag_end();
        assert_eq!(controller.state(), DragState::Idle);

        controller.drag_start(0, 4);
        controller.drag_over(1);
        controller.drag_over(3);
        assert_eq!(controller.active_source(), Some(0));
        assert_eq!(controller.drop_candidates().collect::<Vec<_>>(), vec![1, 3]);

        controller.drag_leave(1);
        assert!(!controller.is_drop_candidate(1));

        controller.drag_end();
        assert_eq!(controller.active_source(), None);
        assert_eq!(controller.drop_candidates().count(), 0);
    }
}
