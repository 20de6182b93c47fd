//! # Ordered listener set
//!
//! [`ListenerSet`] keeps listeners in insertion order (the dispatch order) and
//! rejects a second insertion of the same [`ListenerId`].
//!
//! Dispatch never iterates the set in place: [`ListenerSet::snapshot`] clones
//! the handles (ref-count bumps only) so listeners can add or remove listeners
//! during their own invocation without invalidating anything.

use super::listener::{Listener, ListenerId};

/// Insertion-ordered set of unique listeners.
pub(crate) struct ListenerSet<T> {
    entries: Vec<Listener<T>>,
}

impl<T> ListenerSet<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends `listener` unless its id is already present.
    pub(crate) fn insert(&mut self, listener: Listener<T>) -> bool {
        if self.contains(listener.id()) {
            return false;
        }
        self.entries.push(listener);
        true
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        match self.entries.iter().position(|l| l.id() == id) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    pub(crate) fn contains(&self, id: ListenerId) -> bool {
        self.entries.iter().any(|l| l.id() == id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn snapshot(&self) -> Vec<Listener<T>> {
        self.entries.clone()
    }
}

impl<T> Default for ListenerSet<T> {
    fn default() -> Self {
        Self::new()
    }
}
