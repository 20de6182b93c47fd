//! # One-shot listeners
//!
//! `once(event, listener)` registers a **wrapper** in place of the listener.
//! The wrapper has its own [`ListenerId`], so it coexists with a durable `on`
//! registration of the same listener, and [`OnceTable`] remembers which
//! wrappers stand in for which original so that `off(event, original)` can
//! remove them too.
//!
//! ## Rules
//! - the wrapper removes itself from the registry **before** calling the original,
//!   so a re-entrant emit from inside the listener cannot fire it again;
//! - if the wrapper is already gone when its turn comes (removed by `off`, by its
//!   disposer, or by a sibling listener), the original is not called;
//! - table entries are dropped on every removal path (fire, disposer, `off`,
//!   `clear`), so the table never outlives the wrappers it describes.

use std::collections::HashMap;
use std::hash::Hash;

use super::listener::{Invocation, Listener, ListenerId};
use crate::events::EventName;

/// Builds the one-shot wrapper for `original`.
///
/// `take_slot` must remove the wrapper (`id`) from the registry and report
/// whether it was still registered; the original only runs when it was.
pub(crate) fn wrap<T, F>(id: ListenerId, original: Listener<T>, take_slot: F) -> Listener<T>
where
    T: 'static,
    F: Fn() -> bool + Send + Sync + 'static,
{
    Listener::with_id(id, move |data| {
        if take_slot() {
            original.invoke(data)
        } else {
            Invocation::Done
        }
    })
}

/// Side table: original listener → wrappers registered for it, per event.
pub(crate) struct OnceTable<K> {
    wrappers: HashMap<(EventName<K>, ListenerId), Vec<ListenerId>>,
    originals: HashMap<ListenerId, (EventName<K>, ListenerId)>,
}

impl<K: Clone + Eq + Hash> OnceTable<K> {
    pub(crate) fn new() -> Self {
        Self {
            wrappers: HashMap::new(),
            originals: HashMap::new(),
        }
    }

    pub(crate) fn record(&mut self, event: EventName<K>, original: ListenerId, wrapper: ListenerId) {
        self.originals.insert(wrapper, (event.clone(), original));
        self.wrappers.entry((event, original)).or_default().push(wrapper);
    }

    /// Removes and returns every wrapper standing in for `original` on `event`.
    pub(crate) fn take(&mut self, event: &EventName<K>, original: ListenerId) -> Vec<ListenerId> {
        let taken = self
            .wrappers
            .remove(&(event.clone(), original))
            .unwrap_or_default();
        for wrapper in &taken {
            self.originals.remove(wrapper);
        }
        taken
    }

    /// Drops the entry of a wrapper that left the registry on its own.
    pub(crate) fn forget_wrapper(&mut self, wrapper: ListenerId) {
        let Some(key) = self.originals.remove(&wrapper) else {
            return;
        };
        if let Some(list) = self.wrappers.get_mut(&key) {
            list.retain(|w| *w != wrapper);
            if list.is_empty() {
                self.wrappers.remove(&key);
            }
        }
    }

    pub(crate) fn forget_event(&mut self, event: &EventName<K>) {
        self.wrappers.retain(|(name, _), _| name != event);
        self.originals.retain(|_, (name, _)| name != event);
    }

    pub(crate) fn clear(&mut self) {
        self.wrappers.clear();
        self.originals.clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.originals.len()
    }
}

impl<K: Clone + Eq + Hash> Default for OnceTable<K> {
    fn default() -> Self {
        Self::new()
    }
}
