//! # Listener registry
//!
//! Owns every listener set of one remitter plus the once-wrapper table:
//! - `named`: user event name → [`ListenerSet<V>`]
//! - `any`: wildcard listeners, fed [`AnyEvent<K, V>`]
//! - `error`: error listeners, fed [`RemitterError`]
//!
//! ## Rules
//! - a `named` key is never present with an empty set; emptying a set deletes it
//!   (relay activation and `has` rely on "key present ⇒ non-empty");
//! - `add_*` report whether the set went from empty to non-empty;
//! - `remove` also removes once-wrappers registered for the same original and
//!   reports whether the set was emptied by this call;
//! - unknown names are no-ops, never faults.
//!
//! The registry itself is plain data; [`Remitter`](crate::Remitter) keeps it
//! behind a mutex and never holds that mutex while user code runs.

use std::collections::HashMap;

use super::listener::{Listener, ListenerId};
use super::once::OnceTable;
use super::set::ListenerSet;
use crate::error::RemitterError;
use crate::events::{AnyEvent, EventKey, EventName};

/// Outcome of a removal.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Removal {
    /// At least one listener (or once-wrapper) was removed.
    pub removed: bool,
    /// The event's set went from non-empty to empty.
    pub emptied: bool,
}

pub(crate) struct ListenerRegistry<K, V> {
    named: HashMap<K, ListenerSet<V>>,
    any: ListenerSet<AnyEvent<K, V>>,
    error: ListenerSet<RemitterError>,
    once: OnceTable<K>,
}

impl<K: EventKey, V> ListenerRegistry<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            named: HashMap::new(),
            any: ListenerSet::new(),
            error: ListenerSet::new(),
            once: OnceTable::new(),
        }
    }

    pub(crate) fn add_named(&mut self, event: K, listener: Listener<V>) -> bool {
        let set = self.named.entry(event).or_default();
        let was_empty = set.is_empty();
        set.insert(listener) && was_empty
    }

    pub(crate) fn add_any(&mut self, listener: Listener<AnyEvent<K, V>>) -> bool {
        insert_first(&mut self.any, listener)
    }

    pub(crate) fn add_error(&mut self, listener: Listener<RemitterError>) -> bool {
        insert_first(&mut self.error, listener)
    }

    pub(crate) fn record_once(&mut self, event: EventName<K>, original: ListenerId, wrapper: ListenerId) {
        self.once.record(event, original, wrapper);
    }

    /// Removes `id` and any once-wrappers standing in for it.
    pub(crate) fn remove(&mut self, event: &EventName<K>, id: ListenerId) -> Removal {
        self.once.forget_wrapper(id);
        let mut ids = self.once.take(event, id);
        ids.push(id);

        match event {
            EventName::Named(k) => {
                let Some(set) = self.named.get_mut(k) else {
                    return Removal::default();
                };
                let removal = remove_all(set, &ids);
                if set.is_empty() {
                    self.named.remove(k);
                }
                removal
            }
            EventName::Any => remove_all(&mut self.any, &ids),
            EventName::Error => remove_all(&mut self.error, &ids),
        }
    }

    /// Drops one event's listeners, or all of them when `event` is `None`.
    pub(crate) fn clear(&mut self, event: Option<&EventName<K>>) {
        match event {
            None => {
                self.named.clear();
                self.any.clear();
                self.error.clear();
                self.once.clear();
            }
            Some(name) => {
                match name {
                    EventName::Named(k) => {
                        self.named.remove(k);
                    }
                    EventName::Any => self.any.clear(),
                    EventName::Error => self.error.clear(),
                }
                self.once.forget_event(name);
            }
        }
    }

    /// With a name: that set is non-empty. Without: any set is non-empty.
    pub(crate) fn has(&self, event: Option<&EventName<K>>) -> bool {
        self.count(event) > 0
    }

    pub(crate) fn count(&self, event: Option<&EventName<K>>) -> usize {
        match event {
            Some(EventName::Named(k)) => self.named.get(k).map_or(0, ListenerSet::len),
            Some(EventName::Any) => self.any.len(),
            Some(EventName::Error) => self.error.len(),
            None => {
                self.named.values().map(ListenerSet::len).sum::<usize>()
                    + self.any.len()
                    + self.error.len()
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, event: &EventName<K>, id: ListenerId) -> bool {
        match event {
            EventName::Named(k) => self.named.get(k).is_some_and(|set| set.contains(id)),
            EventName::Any => self.any.contains(id),
            EventName::Error => self.error.contains(id),
        }
    }

    pub(crate) fn snapshot_named(&self, event: &K) -> Vec<Listener<V>> {
        self.named
            .get(event)
            .map(ListenerSet::snapshot)
            .unwrap_or_default()
    }

    pub(crate) fn snapshot_any(&self) -> Vec<Listener<AnyEvent<K, V>>> {
        self.any.snapshot()
    }

    pub(crate) fn snapshot_error(&self) -> Vec<Listener<RemitterError>> {
        self.error.snapshot()
    }

    #[cfg(test)]
    pub(crate) fn once_len(&self) -> usize {
        self.once.len()
    }
}

impl<K: EventKey, V> Default for ListenerRegistry<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_first<T>(set: &mut ListenerSet<T>, listener: Listener<T>) -> bool {
    let was_empty = set.is_empty();
    set.insert(listener) && was_empty
}

fn remove_all<T>(set: &mut ListenerSet<T>, ids: &[ListenerId]) -> Removal {
    let was_empty = set.is_empty();
    let mut removed = false;
    for id in ids {
        removed |= set.remove(*id);
    }
    Removal {
        removed,
        emptied: removed && !was_empty && set.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Registry = ListenerRegistry<&'static str, u32>;

    fn noop() -> Listener<u32> {
        Listener::new(|_: &u32| {})
    }

    #[test]
    fn test_add_reports_first_listener_only() {
        let mut reg = Registry::new();
        let (a, b) = (noop(), noop());

        assert!(reg.add_named("e", a.clone()));
        assert!(!reg.add_named("e", b));
        assert!(!reg.add_named("e", a));
        assert_eq!(reg.count(Some(&EventName::Named("e"))), 2);
        assert!(reg.add_named("f", noop()));
    }

    #[test]
    fn test_remove_deletes_empty_key() {
        let mut reg = Registry::new();
        let a = noop();
        reg.add_named("e", a.clone());

        let removal = reg.remove(&EventName::Named("e"), a.id());
        assert_eq!(
            removal,
            Removal {
                removed: true,
                emptied: true
            }
        );
        assert!(!reg.has(Some(&EventName::Named("e"))));
        assert!(!reg.named.contains_key("e"));
        assert!(!reg.has(None));

        assert_eq!(reg.remove(&EventName::Named("e"), a.id()), Removal::default());
        assert_eq!(reg.remove(&EventName::Named("zzz"), a.id()), Removal::default());
    }

    #[test]
    fn test_remove_takes_once_wrappers_along() {
        let mut reg = Registry::new();
        let original = noop();
        let wrapper = Listener::with_id(ListenerId::next(), |_: &u32| {
            crate::listeners::listener::Invocation::Done
        });

        reg.add_named("e", original.clone());
        reg.add_named("e", wrapper.clone());
        reg.record_once(EventName::Named("e"), original.id(), wrapper.id());
        assert_eq!(reg.count(Some(&EventName::Named("e"))), 2);

        let removal = reg.remove(&EventName::Named("e"), original.id());
        assert!(removal.removed && removal.emptied);
        assert_eq!(reg.once_len(), 0);
    }

    #[test]
    fn test_removing_wrapper_directly_forgets_its_entry() {
        let mut reg = Registry::new();
        let original = noop();
        let wrapper = noop();
        reg.add_named("e", wrapper.clone());
        reg.record_once(EventName::Named("e"), original.id(), wrapper.id());

        assert!(reg.remove(&EventName::Named("e"), wrapper.id()).removed);
        assert_eq!(reg.once_len(), 0);
    }

    #[test]
    fn test_sentinel_sets_and_aggregate_has() {
        let mut reg = Registry::new();
        let any = Listener::new(|_: &AnyEvent<&'static str, u32>| {});
        let err = Listener::new(|_: &RemitterError| {});

        assert!(reg.add_any(any.clone()));
        assert!(reg.has(Some(&EventName::Any)));
        assert!(reg.has(None));
        assert!(!reg.has(Some(&EventName::Named("e"))));

        assert!(reg.add_error(err.clone()));
        assert_eq!(reg.count(None), 2);

        assert!(reg.remove(&EventName::Any, any.id()).emptied);
        assert!(reg.has(None));
        assert!(reg.remove(&EventName::Error, err.id()).emptied);
        assert!(!reg.has(None));
    }

    #[test]
    fn test_clear_one_or_all() {
        let mut reg = Registry::new();
        reg.add_named("a", noop());
        reg.add_named("b", noop());
        reg.add_any(Listener::new(|_: &AnyEvent<&'static str, u32>| {}));

        reg.clear(Some(&EventName::Named("a")));
        assert!(!reg.has(Some(&EventName::Named("a"))));
        assert!(reg.has(Some(&EventName::Named("b"))));

        reg.clear(Some(&EventName::Named("missing")));
        reg.clear(None);
        assert!(!reg.has(None));
    }

    #[test]
    fn test_snapshots() {
        let mut reg = Registry::new();
        let a = noop();
        reg.add_named("e", a.clone());

        assert_eq!(reg.snapshot_named(&"e"), vec![a.clone()]);
        assert!(reg.snapshot_named(&"other").is_empty());
        assert!(reg.snapshot_any().is_empty());
        assert!(reg.snapshot_error().is_empty());
        assert!(reg.contains(&EventName::Named("e"), a.id()));
    }
}
