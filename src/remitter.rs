//! # Remitter: typed event emitter with demand-driven relays.
//!
//! [`Remitter`] owns one listener registry, one once-wrapper table and one
//! relay set, and exposes the public API over them:
//!
//! ```text
//! on / once / on_any / on_error ──► registry.add_*      ──► 0→1?  ──► relays.try_start_all
//! off / disposer / clear        ──► registry.remove     ──► 1→0?  ──► relays.try_stop_all
//! emit(e, x)                    ──► snapshot(e)  ─► invoke each with &x
//!                               └─► snapshot(ANY_EVENT) ─► invoke each with &AnyEvent { e, x }
//! invoke failure                ──► report ─► ERROR_EVENT listeners  | default sink
//! remit(e, start)               ──► relays.register ─► start now if the predicate holds
//! dispose()                     ──► clear_all ─► retire every relay
//! ```
//!
//! ## Rules
//! - `emit` is synchronous and never waits for detached listener futures.
//! - Listeners see a snapshot taken when dispatch of their set begins:
//!   listeners added during the dispatch are not called in that round, and
//!   listeners removed during it are still called (one-shot listeners excepted).
//! - No internal lock is held while user code runs.
//! - `dispose()` resets the instance; it stays usable afterwards.
//!
//! ## Example
//! ```rust
//! use remitter::{Disposer, Listener, Remitter};
//! use std::sync::{Arc, Mutex};
//!
//! let remitter: Remitter<&str, u32> = Remitter::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! // Side effect that only runs while someone listens to "tick".
//! remitter.remit("tick", |r: &Remitter<&'static str, u32>| {
//!     r.emit("tick", 0);
//!     Disposer::noop()
//! });
//!
//! let s = Arc::clone(&seen);
//! let off = remitter.on("tick", Listener::new(move |n: &u32| s.lock().unwrap().push(*n)));
//! remitter.emit("tick", 1);
//! off.dispose();
//! remitter.emit("tick", 2);
//!
//! assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::config::RemitterConfig;
use crate::disposer::Disposer;
use crate::dispatch::{guard, sink};
use crate::error::RemitterError;
use crate::events::{AnyEvent, EventKey, EventName};
use crate::listeners::{once, Invocation, Listener, ListenerId, ListenerRegistry};
use crate::receiver::EventReceiver;
use crate::relays::{Relay, RelayManager, RelayTarget};

struct Inner<K: EventKey, V: Send + Sync + 'static> {
    config: RemitterConfig,
    registry: Mutex<ListenerRegistry<K, V>>,
    relays: RelayManager<K, V>,
}

impl<K: EventKey, V: Send + Sync + 'static> Drop for Inner<K, V> {
    fn drop(&mut self) {
        for entry in self.relays.drain() {
            entry.retire(None);
        }
    }
}

/// Typed in-process event emitter.
///
/// `K` is the event-name type, `V` the payload type. Handles are cheap to
/// clone and share one instance.
pub struct Remitter<K: EventKey, V: Send + Sync + 'static = ()> {
    inner: Arc<Inner<K, V>>,
}

/// Non-owning handle held by disposers, once-wrappers and pending relay starts.
pub(crate) struct WeakRemitter<K: EventKey, V: Send + Sync + 'static> {
    inner: Weak<Inner<K, V>>,
}

impl<K: EventKey, V: Send + Sync + 'static> WeakRemitter<K, V> {
    pub(crate) fn upgrade(&self) -> Option<Remitter<K, V>> {
        self.inner.upgrade().map(|inner| Remitter { inner })
    }
}

impl<K: EventKey, V: Send + Sync + 'static> Clone for WeakRemitter<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<K, V> Remitter<K, V>
where
    K: EventKey,
    V: Send + Sync + 'static,
{
    /// Creates an empty remitter with [`RemitterConfig::default`].
    pub fn new() -> Self {
        Self::with_config(RemitterConfig::default())
    }

    /// Creates an empty remitter with the given configuration.
    pub fn with_config(config: RemitterConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: Mutex::new(ListenerRegistry::new()),
                relays: RelayManager::new(config.clone()),
                config,
            }),
        }
    }

    pub fn config(&self) -> &RemitterConfig {
        &self.inner.config
    }

    /// Subscription-only view of this remitter (no `emit`, no `remit`).
    pub fn receiver(&self) -> EventReceiver<K, V> {
        EventReceiver::new(self.clone())
    }

    // ---- Emission ----

    /// Emits `data` to the listeners of `event`, then to `ANY_EVENT` listeners.
    ///
    /// Each listener call is isolated: a panic, an `Err`, or a failing detached
    /// future is reported on the error channel and never reaches the caller.
    pub fn emit(&self, event: K, data: V) {
        let direct = self.inner.registry.lock().snapshot_named(&event);
        if !direct.is_empty() {
            self.dispatch(&EventName::Named(event.clone()), direct, &data);
        }

        let wildcard = self.inner.registry.lock().snapshot_any();
        if !wildcard.is_empty() {
            self.dispatch(&EventName::Any, wildcard, &AnyEvent { event, data });
        }
    }

    /// Emits an event that carries no data (`V::default()`).
    pub fn emit_dataless(&self, event: K)
    where
        V: Default,
    {
        self.emit(event, V::default());
    }

    // ---- Subscription ----

    /// Adds `listener` to `event`; re-adding the same listener is a no-op.
    ///
    /// The returned disposer removes it again.
    pub fn on(&self, event: K, listener: Listener<V>) -> Disposer {
        let name = EventName::Named(event.clone());
        self.subscribe(name, listener, move |reg, l| reg.add_named(event, l))
    }

    /// Adds a listener that receives every emitted event.
    pub fn on_any(&self, listener: Listener<AnyEvent<K, V>>) -> Disposer {
        self.subscribe(EventName::Any, listener, |reg, l| reg.add_any(l))
    }

    /// Adds a listener for errors caught from listeners and relays.
    pub fn on_error(&self, listener: Listener<RemitterError>) -> Disposer {
        self.subscribe(EventName::Error, listener, |reg, l| reg.add_error(l))
    }

    /// Adds `listener` to `event` for a single invocation.
    ///
    /// Independent of an `on` registration of the same listener; `off(event,
    /// listener)` removes both.
    pub fn once(&self, event: K, listener: Listener<V>) -> Disposer {
        let name = EventName::Named(event.clone());
        self.subscribe_once(name, listener, move |reg, l| reg.add_named(event, l))
    }

    pub fn once_any(&self, listener: Listener<AnyEvent<K, V>>) -> Disposer {
        self.subscribe_once(EventName::Any, listener, |reg, l| reg.add_any(l))
    }

    pub fn once_error(&self, listener: Listener<RemitterError>) -> Disposer {
        self.subscribe_once(EventName::Error, listener, |reg, l| reg.add_error(l))
    }

    /// Removes `listener` (and its one-shot registrations) from `event`.
    ///
    /// Returns whether anything was removed.
    pub fn off(&self, event: &K, listener: &Listener<V>) -> bool {
        self.unsubscribe(&EventName::Named(event.clone()), listener.id())
    }

    pub fn off_any(&self, listener: &Listener<AnyEvent<K, V>>) -> bool {
        self.unsubscribe(&EventName::Any, listener.id())
    }

    pub fn off_error(&self, listener: &Listener<RemitterError>) -> bool {
        self.unsubscribe(&EventName::Error, listener.id())
    }

    /// Removes every listener of `event`.
    pub fn clear(&self, event: &K) {
        self.clear_name(Some(&EventName::Named(event.clone())));
    }

    pub fn clear_any(&self) {
        self.clear_name(Some(&EventName::Any));
    }

    pub fn clear_error(&self) {
        self.clear_name(Some(&EventName::Error));
    }

    /// Removes every listener of every event, sentinels included.
    pub fn clear_all(&self) {
        self.clear_name(None);
    }

    // ---- Queries ----

    /// `true` if `event` has at least one listener.
    pub fn has(&self, event: &K) -> bool {
        self.inner
            .registry
            .lock()
            .has(Some(&EventName::Named(event.clone())))
    }

    /// `true` if `ANY_EVENT` has at least one listener.
    pub fn has_any(&self) -> bool {
        self.inner.registry.lock().has(Some(&EventName::Any))
    }

    /// `true` if `ERROR_EVENT` has at least one listener.
    pub fn has_error(&self) -> bool {
        self.inner.registry.lock().has(Some(&EventName::Error))
    }

    /// `true` if any event (sentinels included) has at least one listener.
    pub fn has_listeners(&self) -> bool {
        self.inner.registry.lock().has(None)
    }

    /// Number of listeners of `event`.
    #[deprecated(note = "use `has` instead")]
    pub fn count(&self, event: &K) -> usize {
        self.inner
            .registry
            .lock()
            .count(Some(&EventName::Named(event.clone())))
    }

    /// Number of listeners across all events, sentinels included.
    #[deprecated(note = "use `has_listeners` instead")]
    pub fn count_all(&self) -> usize {
        self.inner.registry.lock().count(None)
    }

    // ---- Relays ----

    /// Runs `start` while `event` (or `ANY_EVENT`) has listeners.
    ///
    /// `start` is called when the first listener arrives (immediately, if there
    /// already is one) and receives this remitter. The disposer it produces runs
    /// when the last listener leaves. The returned disposer unregisters the relay
    /// and stops it if it is running or still starting.
    pub fn remit<F, R>(&self, event: K, start: F) -> Disposer
    where
        F: Fn(&Remitter<K, V>) -> R + Send + Sync + 'static,
        R: Into<Relay>,
    {
        self.relay(RelayTarget::Event(event), start)
    }

    /// Runs `start` while any event at all has listeners.
    pub fn remit_any<F, R>(&self, start: F) -> Disposer
    where
        F: Fn(&Remitter<K, V>) -> R + Send + Sync + 'static,
        R: Into<Relay>,
    {
        self.relay(RelayTarget::Any, start)
    }

    /// Removes all listeners and stops and removes all relays.
    ///
    /// The instance remains usable: new listeners and relays may be added.
    pub fn dispose(&self) {
        self.clear_all();
        for entry in self.inner.relays.drain() {
            entry.retire(Some(self));
        }
    }

    // ---- Internals ----

    pub(crate) fn downgrade(&self) -> WeakRemitter<K, V> {
        WeakRemitter {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Delivers `err` to `ERROR_EVENT` listeners, or the default sink.
    ///
    /// Failures of error listeners go to the default sink, never back here.
    pub(crate) fn report(&self, err: RemitterError) {
        let listeners = self.inner.registry.lock().snapshot_error();
        if listeners.is_empty() {
            sink::unhandled(self.config(), &err);
            return;
        }

        for listener in listeners {
            let failure = match guard::call(self.config().catch_panics, || listener.invoke(&err)) {
                Ok(Invocation::Done) => None,
                Ok(Invocation::Failed(e)) | Err(e) => Some(e),
                Ok(Invocation::Detached(fut)) => {
                    let config = self.config().clone();
                    guard::spawn_guarded(fut, move |outcome| {
                        if let Err(e) = outcome {
                            sink::unhandled(&config, &RemitterError::listener(&EventName::<K>::Error, e));
                        }
                    });
                    None
                }
            };
            if let Some(e) = failure {
                sink::unhandled(self.config(), &RemitterError::listener(&EventName::<K>::Error, e));
            }
        }
    }

    fn dispatch<T>(&self, event: &EventName<K>, listeners: Vec<Listener<T>>, data: &T) {
        for listener in listeners {
            match guard::call(self.config().catch_panics, || listener.invoke(data)) {
                Ok(Invocation::Done) => {}
                Ok(Invocation::Failed(e)) | Err(e) => {
                    self.report(RemitterError::listener(event, e));
                }
                Ok(Invocation::Detached(fut)) => self.detach(event, fut),
            }
        }
    }

    fn detach(&self, event: &EventName<K>, fut: futures::future::BoxFuture<'static, anyhow::Result<()>>) {
        let owner = self.downgrade();
        let config = self.config().clone();
        let event = event.clone();
        guard::spawn_guarded(fut, move |outcome| {
            let Err(e) = outcome else {
                return;
            };
            let err = RemitterError::listener(&event, e);
            match owner.upgrade() {
                Some(remitter) => remitter.report(err),
                None => sink::unhandled(&config, &err),
            }
        });
    }

    fn subscribe<T, I>(&self, name: EventName<K>, listener: Listener<T>, insert: I) -> Disposer
    where
        I: FnOnce(&mut ListenerRegistry<K, V>, Listener<T>) -> bool,
    {
        let id = listener.id();
        let first = insert(&mut *self.inner.registry.lock(), listener);
        if first {
            self.inner.relays.try_start_all(self);
        }
        self.unsubscriber(name, id)
    }

    fn subscribe_once<T, I>(&self, name: EventName<K>, listener: Listener<T>, insert: I) -> Disposer
    where
        T: 'static,
        I: FnOnce(&mut ListenerRegistry<K, V>, Listener<T>) -> bool,
    {
        let wrapper_id = ListenerId::next();
        let owner = self.downgrade();
        let slot = name.clone();
        let wrapper = once::wrap(wrapper_id, listener.clone(), move || {
            owner
                .upgrade()
                .is_some_and(|remitter| remitter.unsubscribe(&slot, wrapper_id))
        });

        let first = {
            let mut registry = self.inner.registry.lock();
            let first = insert(&mut *registry, wrapper);
            registry.record_once(name.clone(), listener.id(), wrapper_id);
            first
        };
        if first {
            self.inner.relays.try_start_all(self);
        }
        self.unsubscriber(name, wrapper_id)
    }

    fn unsubscriber(&self, name: EventName<K>, id: ListenerId) -> Disposer {
        let owner = self.downgrade();
        Disposer::new(move || {
            if let Some(remitter) = owner.upgrade() {
                remitter.unsubscribe(&name, id);
            }
        })
    }

    fn unsubscribe(&self, name: &EventName<K>, id: ListenerId) -> bool {
        let removal = self.inner.registry.lock().remove(name, id);
        if removal.emptied {
            self.inner.relays.try_stop_all(self);
        }
        removal.removed
    }

    fn clear_name(&self, name: Option<&EventName<K>>) {
        self.inner.registry.lock().clear(name);
        self.inner.relays.try_stop_all(self);
    }

    fn relay<F, R>(&self, target: RelayTarget<K>, start: F) -> Disposer
    where
        F: Fn(&Remitter<K, V>) -> R + Send + Sync + 'static,
        R: Into<Relay>,
    {
        let entry = self
            .inner
            .relays
            .register(target, Box::new(move |remitter: &Remitter<K, V>| start(remitter).into()));
        if entry.is_demanded(self) {
            entry.start(self);
        }

        let owner = self.downgrade();
        let entry = Arc::downgrade(&entry);
        Disposer::new(move || {
            let (Some(remitter), Some(entry)) = (owner.upgrade(), entry.upgrade()) else {
                return;
            };
            remitter.inner.relays.unregister(&entry);
            entry.retire(Some(&remitter));
        })
    }
}

impl<K: EventKey, V: Send + Sync + 'static> Clone for Remitter<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: EventKey, V: Send + Sync + 'static> Default for Remitter<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: EventKey, V: Send + Sync + 'static> fmt::Debug for Remitter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Remitter")
            .field("listeners", &self.inner.registry.lock().count(None))
            .field("relays", &self.inner.relays.len())
            .field("config", &self.inner.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type R = Remitter<&'static str, u32>;

    fn recorder() -> (Listener<u32>, Arc<Mutex<Vec<u32>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = Arc::clone(&log);
        (Listener::new(move |n: &u32| l.lock().push(*n)), log)
    }

    #[test]
    fn test_on_emit_off() {
        let remitter = R::new();
        let (listener, log) = recorder();

        let off = remitter.on("a", listener.clone());
        assert!(remitter.has(&"a"));
        remitter.emit("a", 1);
        remitter.emit("b", 2);

        assert!(off.dispose());
        assert!(!remitter.has(&"a"));
        remitter.emit("a", 3);
        assert_eq!(*log.lock(), vec![1]);
        assert!(!remitter.off(&"a", &listener));
    }

    #[test]
    fn test_re_adding_same_listener_is_noop() {
        let remitter = R::new();
        let (listener, log) = recorder();
        remitter.on("a", listener.clone());
        remitter.on("a", listener.clone());
        remitter.emit("a", 1);
        assert_eq!(*log.lock(), vec![1]);
        #[allow(deprecated)]
        let count = remitter.count(&"a");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_once_wrapper_removed_before_reentrant_emit() {
        let remitter = R::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let inner = remitter.clone();
        remitter.once(
            "a",
            Listener::new(move |_: &u32| {
                h.fetch_add(1, Ordering::SeqCst);
                inner.emit("a", 0);
            }),
        );

        remitter.emit("a", 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!remitter.has(&"a"));
        assert_eq!(remitter.inner.registry.lock().once_len(), 0);
    }

    #[test]
    fn test_listener_added_during_emit_waits_for_next_round() {
        let remitter = R::new();
        let (late, log) = recorder();
        let inner = remitter.clone();
        remitter.on(
            "a",
            Listener::new(move |_: &u32| {
                inner.on("a", late.clone());
            }),
        );

        remitter.emit("a", 1);
        assert!(log.lock().is_empty());
        remitter.emit("a", 2);
        assert_eq!(*log.lock(), vec![2]);
    }

    #[test]
    fn test_once_removed_by_sibling_does_not_fire() {
        let remitter = R::new();
        let (target, log) = recorder();
        let inner = remitter.clone();
        let victim = target.clone();
        remitter.on(
            "a",
            Listener::new(move |_: &u32| {
                inner.off(&"a", &victim);
            }),
        );
        remitter.once("a", target);

        remitter.emit("a", 1);
        assert!(log.lock().is_empty());
        assert_eq!(remitter.inner.registry.lock().once_len(), 0);
        #[allow(deprecated)]
        let count = remitter.count(&"a");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_disposers_do_not_keep_instance_alive() {
        let remitter = R::new();
        let weak = Arc::downgrade(&remitter.inner);
        let off = remitter.on("a", Listener::new(|_: &u32| {}));
        drop(remitter);
        assert!(weak.upgrade().is_none());
        assert!(off.dispose());
    }

    #[test]
    fn test_dropping_last_handle_stops_relays() {
        let stops = Arc::new(AtomicUsize::new(0));
        let s = Arc::clone(&stops);
        let remitter = R::new();
        remitter.remit("a", move |_: &R| {
            let s = Arc::clone(&s);
            Disposer::new(move || {
                s.fetch_add(1, Ordering::SeqCst);
            })
        });
        remitter.on("a", Listener::new(|_: &u32| {}));
        drop(remitter);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_debug_output() {
        let remitter = R::new();
        remitter.on("a", Listener::new(|_: &u32| {}));
        let dbg = format!("{remitter:?}");
        assert!(dbg.contains("listeners: 1"));
        assert!(dbg.contains("relays: 0"));
    }
}
