// Discovery frontier
//
// Entities mentioned while rendering but not requested directly. Owned by
// one generation run and passed by reference into every render call.

use crate::runtime::ObjectId;
use indexmap::{IndexMap, IndexSet};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontierState {
    /// Primary names are being rendered; discoveries are queued
    Accumulating,
    /// Queued entries are being consumed
    Draining,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub handle: ObjectId,
    pub name: String,
}

/// Deduplicating queue of discovered entities
#[derive(Debug)]
pub struct Frontier {
    state: FrontierState,
    transitive: bool,
    queued: IndexMap<ObjectId, String>,
    retired: IndexSet<ObjectId>,
}

impl Frontier {
    /// `transitive` keeps accepting discoveries made while draining
    pub fn new(transitive: bool) -> Self {
        Self {
            state: FrontierState::Accumulating,
            transitive,
            queued: IndexMap::new(),
            retired: IndexSet::new(),
        }
    }

    pub fn state(&self) -> FrontierState {
        self.state
    }

    /// Queue an entity. Returns whether it was newly added.
    pub fn add(&mut self, handle: ObjectId, name: impl Into<String>) -> bool {
        if self.state == FrontierState::Draining && !self.transitive {
            return false;
        }
        if self.retired.contains(&handle) || self.queued.contains_key(&handle) {
            return false;
        }
        let name = name.into();
        trace!(name = %name, "queued for documentation");
        self.queued.insert(handle, name);
        true
    }

    /// Take the oldest queued entry; it can never be queued again
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        let (handle, name) = self.queued.shift_remove_index(0)?;
        self.retired.insert(handle);
        Some(FrontierEntry { handle, name })
    }

    /// Mark an entity as handled without it ever being queued
    pub fn retire(&mut self, handle: ObjectId) {
        self.queued.shift_remove(&handle);
        self.retired.insert(handle);
    }

    pub fn start_draining(&mut self) {
        self.state = FrontierState::Draining;
    }

    pub fn contains(&self, handle: ObjectId) -> bool {
        self.queued.contains_key(&handle)
    }

    pub fn is_retired(&self, handle: ObjectId) -> bool {
        self.retired.contains(&handle)
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    /// Queued entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = FrontierEntry> + '_ {
        self.queued.iter().map(|(&handle, name)| FrontierEntry {
            handle,
            name: name.clone(),
        })
    }
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_deduplicates() {
        let mut frontier = Frontier::default();
        assert!(frontier.add(ObjectId(1), "a"));
        assert!(!frontier.add(ObjectId(1), "a"));
        assert!(!frontier.add(ObjectId(1), "alias"));
        assert!(frontier.add(ObjectId(2), "b"));
        assert_eq!(frontier.len(), 2);
    }

    #[test]
    fn test_pop_is_fifo_and_retires() {
        let mut frontier = Frontier::default();
        frontier.add(ObjectId(3), "c");
        frontier.add(ObjectId(1), "a");
        let first = frontier.pop().unwrap();
        assert_eq!(first, FrontierEntry { handle: ObjectId(3), name: "c".to_string() });
        assert!(frontier.is_retired(ObjectId(3)));
        assert!(!frontier.add(ObjectId(3), "c"));
        assert_eq!(frontier.pop().unwrap().handle, ObjectId(1));
        assert!(frontier.pop().is_none());
    }

    #[test]
    fn test_draining_rejects_new_entries() {
        let mut frontier = Frontier::new(false);
        frontier.add(ObjectId(1), "a");
        frontier.start_draining();
        assert_eq!(frontier.state(), FrontierState::Draining);
        assert!(!frontier.add(ObjectId(2), "b"));
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn test_transitive_draining_accepts() {
        let mut frontier = Frontier::new(true);
        frontier.start_draining();
        assert!(frontier.add(ObjectId(2), "b"));
        frontier.pop();
        assert!(!frontier.add(ObjectId(2), "b"));
    }

    #[test]
    fn test_retire_unqueued() {
        let mut frontier = Frontier::default();
        frontier.add(ObjectId(5), "e");
        frontier.retire(ObjectId(5));
        frontier.retire(ObjectId(6));
        assert!(frontier.is_empty());
        assert!(!frontier.add(ObjectId(6), "f"));
        assert!(!frontier.contains(ObjectId(5)));
    }

    #[test]
    fn test_entries_preserve_order() {
        let mut frontier = Frontier::default();
        frontier.add(ObjectId(9), "z");
        frontier.add(ObjectId(4), "d");
        let names: Vec<String> = frontier.entries().map(|e| e.name).collect();
        assert_eq!(names, vec!["z", "d"]);
    }
}
