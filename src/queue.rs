//! Ordered document queue for merging
//!
//! The queue order is the merge order. Reordering moves entries in place;
//! there is no separate priority field.

use std::fmt;

use crate::error::{Error, Result};

/// Synthetic id for a queued or loaded document
///
/// Ids come from a per-owner counter and are never reused, even after the
/// entry they named has been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    /// Raw numeric value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out fresh [`DocumentId`]s
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next unused id
    pub fn next_id(&mut self) -> DocumentId {
        self.next += 1;
        DocumentId(self.next)
    }
}

/// User-ordered sequence of documents
#[derive(Debug, Clone)]
pub struct FileQueue<T> {
    entries: Vec<(DocumentId, T)>,
    ids: IdGenerator,
}

impl<T> Default for FileQueue<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            ids: IdGenerator::new(),
        }
    }
}

impl<T> FileQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an item at the end of the queue
    pub fn push(&mut self, item: T) -> DocumentId {
        let id = self.ids.next_id();
        self.entries.push((id, item));
        id
    }

    /// Append several items, keeping their order after the existing entries
    pub fn extend<I>(&mut self, items: I) -> Vec<DocumentId>
    where
        I: IntoIterator<Item = T>,
    {
        items.into_iter().map(|item| self.push(item)).collect()
    }

    /// Build and append several items, all or nothing
    ///
    /// `make` receives the id each item will be stored under. If any call
    /// fails the queue is left unchanged; the ids handed out stay retired.
    pub fn try_extend_with<I, F>(&mut self, items: I, mut make: F) -> Result<Vec<DocumentId>>
    where
        I: IntoIterator,
        F: FnMut(DocumentId, I::Item) -> Result<T>,
    {
        let mut built = Vec::new();
        for item in items {
            let id = self.ids.next_id();
            built.push((id, make(id, item)?));
        }
        let ids = built.iter().map(|(id, _)| *id).collect();
        self.entries.extend(built);
        Ok(ids)
    }

    /// Remove the entry with `id`; later entries shift down by one
    pub fn remove(&mut self, id: DocumentId) -> Option<T> {
        let index = self.position(id)?;
        Some(self.entries.remove(index).1)
    }

    /// Move the entry at `from` so that it ends up at index `to`
    ///
    /// Entries between the two positions shift by one to make room.
    /// Calling this with `from == to` leaves the queue untouched.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.entries.len();
        for index in [from, to] {
            if index >= len {
                return Err(Error::IndexOutOfBounds { index, len });
            }
        }
        if from == to {
            return Ok(());
        }

        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        log::debug!("Moved queue entry {} -> {}", from, to);
        Ok(())
    }

    /// Drop every entry. Ids handed out so far stay retired.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, id: DocumentId) -> Option<&T> {
        self.entries
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, item)| item)
    }

    /// Current index of `id`
    pub fn position(&self, id: DocumentId) -> Option<usize> {
        self.entries.iter().position(|(entry_id, _)| *entry_id == id)
    }

    /// Ids in queue order
    pub fn ids(&self) -> Vec<DocumentId> {
        self.entries.iter().map(|(id, _)| *id).collect()
    }

    /// Entries in queue order
    pub fn iter(&self) -> impl Iterator<Item = (DocumentId, &T)> {
        self.entries.iter().map(|(id, item)| (*id, item))
    }

    /// Start a drag-to-reorder gesture on this queue
    pub fn drag(&mut self) -> DragReorder<'_, T> {
        DragReorder {
            queue: self,
            current: None,
        }
    }
}

/// Translates drag events into queue moves
///
/// A drag gesture starts on one entry and then fires one `enter` per
/// hovered slot. The dragged entry's current index is tracked here, apart
/// from the index it started at, so each `enter` issues at most one move.
pub struct DragReorder<'a, T> {
    queue: &'a mut FileQueue<T>,
    current: Option<usize>,
}

impl<T> DragReorder<'_, T> {
    /// Begin dragging the entry at `index`
    pub fn start(&mut self, index: usize) -> Result<()> {
        let len = self.queue.len();
        if index >= len {
            return Err(Error::IndexOutOfBounds { index, len });
        }
        self.current = Some(index);
        Ok(())
    }

    /// The dragged entry hovers over `index`
    ///
    /// Returns `true` when the queue changed.
    pub fn enter(&mut self, index: usize) -> Result<bool> {
        match self.current {
            Some(current) if current != index => {
                self.queue.move_item(current, index)?;
                self.current = Some(index);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Index the dragged entry currently occupies
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// End the gesture
    pub fn finish(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn abc() -> FileQueue<&'static str> {
        let mut queue = FileQueue::new();
        queue.extend(["A", "B", "C"]);
        queue
    }

    fn items<T: Copy>(queue: &FileQueue<T>) -> Vec<T> {
        queue.iter().map(|(_, item)| *item).collect()
    }

    #[test]
    fn test_move_forward_and_back() {
        let mut queue = abc();
        queue.move_item(0, 2).unwrap();
        assert_eq!(items(&queue), vec!["B", "C", "A"]);

        queue.move_item(2, 0).unwrap();
        assert_eq!(items(&queue), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_move_same_index_is_noop() {
        let mut queue = abc();
        let before = queue.ids();
        queue.move_item(1, 1).unwrap();
        assert_eq!(queue.ids(), before);
    }

    #[test]
    fn test_move_out_of_bounds() {
        let mut queue = abc();
        let result = queue.move_item(0, 3);
        assert!(matches!(
            result,
            Err(Error::IndexOutOfBounds { index: 3, len: 3 })
        ));
        assert_eq!(items(&queue), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_remove_compacts_indices() {
        let mut queue = abc();
        let ids = queue.ids();
        assert_eq!(queue.remove(ids[1]), Some("B"));
        assert_eq!(queue.position(ids[2]), Some(1));
        assert_eq!(queue.remove(ids[1]), None);
    }

    #[test]
    fn test_ids_never_reused() {
        let mut queue = abc();
        let first = queue.ids();
        queue.clear();
        let later = queue.push("D");
        assert!(!first.contains(&later));
    }

    #[test]
    fn test_extend_preserves_prior_order() {
        let mut queue = abc();
        queue.extend(["D", "E"]);
        assert_eq!(items(&queue), vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn test_try_extend_with_is_all_or_nothing() {
        let mut queue = abc();
        let result = queue.try_extend_with(["D", "bad", "E"], |_, item| {
            if item == "bad" {
                Err(Error::NoValidPages)
            } else {
                Ok(item)
            }
        });
        assert!(result.is_err());
        assert_eq!(items(&queue), vec!["A", "B", "C"]);

        let ids = queue.try_extend_with(["D"], |_, item| Ok(item)).unwrap();
        assert_eq!(queue.position(ids[0]), Some(3));
    }

    #[test]
    fn test_drag_sequence() {
        // Drag A from slot 0 across B and C
        let mut queue = abc();
        let mut drag = queue.drag();
        drag.start(0).unwrap();
        assert!(drag.enter(1).unwrap());
        // Re-entering the same slot must not move anything
        assert!(!drag.enter(1).unwrap());
        assert!(drag.enter(2).unwrap());
        assert_eq!(drag.current(), Some(2));
        drag.finish();
        assert_eq!(items(&queue), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_drag_without_start_does_nothing() {
        let mut queue = abc();
        let mut drag = queue.drag();
        assert!(!drag.enter(2).unwrap());
        drag.finish();
        assert_eq!(items(&queue), vec!["A", "B", "C"]);
    }

    proptest! {
        #[test]
        fn prop_moves_keep_every_entry(
            len in 1usize..12,
            moves in proptest::collection::vec((0usize..12, 0usize..12), 0..20),
        ) {
            let mut queue = FileQueue::new();
            queue.extend(0..len);

            for (from, to) in moves {
                let result = queue.move_item(from % len, to % len);
                prop_assert!(result.is_ok());
            }

            let mut seen = items(&queue);
            seen.sort_unstable();
            prop_assert_eq!(seen, (0..len).collect::<Vec<_>>());
        }

        #[test]
        fn prop_repeated_move_matches_single_drag_step(
            len in 2usize..10,
            from in 0usize..10,
            to in 0usize..10,
        ) {
            let (from, to) = (from % len, to % len);
            let mut queue = FileQueue::new();
            queue.extend(0..len);

            let mut drag = queue.drag();
            drag.start(from).unwrap();
            drag.enter(to).unwrap();
            // Identical follow-up events are absorbed by the tracked index
            drag.enter(to).unwrap();
            drag.finish();

            let mut expected: Vec<usize> = (0..len).collect();
            let item = expected.remove(from);
            expected.insert(to, item);
            prop_assert_eq!(items(&queue), expected);
        }
    }
}
