//! # Relay manager: demand-driven start/stop of relay side effects.
//!
//! [`RelayManager`] owns the set of [`RelayEntry`] records of one remitter and
//! re-evaluates them on listener-count transitions:
//! - a set went 0 → 1 ⇒ [`RelayManager::try_start_all`]
//! - a set went 1 → 0 (or `clear`) ⇒ [`RelayManager::try_stop_all`]
//!
//! ## Activation predicate
//! ```text
//! target = Event(e) : has(e) || has(ANY_EVENT)
//! target = Any      : has()              (any listener at all)
//! ```
//!
//! ## Flow
//! ```text
//! start(entry)
//!   ├─ cycle.begin_start() == false ─► nothing (already starting/active, or retired)
//!   └─ guard::call_or_unwind(start_fn(remitter))
//!        ├─ Ready(d)   ─► settle(d)
//!        ├─ Failed(e)  ─► report RelayStart ─► settle(None)
//!        ├─ panic      ─► report RelayStart ─► settle(None)
//!        │              (catch_panics off: settle(None), then re-panic)
//!        └─ Pending(f) ─► spawn_guarded(f) ─► (later) settle(d | None)
//!
//! stop(entry)
//!   └─ cycle.begin_stop()
//!        ├─ Some(d) ─► guard::call(d.dispose())  (panic ─► report RelayStop)
//!        └─ None    ─► nothing now; settle() disposes when the start resolves
//! ```
//!
//! No lock is held while a start function or disposer runs; both may call back
//! into the remitter. Each entry keeps a copy of its owner's configuration so
//! that stops running after the owner is gone still honor it.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::relay::Relay;
use super::state::{RelayCycle, RelayPhase};
use crate::config::RemitterConfig;
use crate::disposer::Disposer;
use crate::dispatch::{guard, sink};
use crate::error::RemitterError;
use crate::events::{EventKey, EventName};
use crate::remitter::Remitter;

pub(crate) type StartFn<K, V> = dyn Fn(&Remitter<K, V>) -> Relay + Send + Sync;

/// What a relay watches: one event (`remit`) or everything (`remit_any`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RelayTarget<K> {
    Event(K),
    Any,
}

impl<K: Clone> RelayTarget<K> {
    fn name(&self) -> EventName<K> {
        match self {
            RelayTarget::Event(event) => EventName::Named(event.clone()),
            RelayTarget::Any => EventName::Any,
        }
    }
}

impl<K: fmt::Debug + Clone> fmt::Display for RelayTarget<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name().fmt(f)
    }
}

/// One `(target, start)` declaration and its lifecycle.
pub(crate) struct RelayEntry<K: EventKey, V: Send + Sync + 'static> {
    target: RelayTarget<K>,
    start: Box<StartFn<K, V>>,
    config: RemitterConfig,
    cycle: Mutex<RelayCycle>,
}

impl<K, V> RelayEntry<K, V>
where
    K: EventKey,
    V: Send + Sync + 'static,
{
    fn new(target: RelayTarget<K>, start: Box<StartFn<K, V>>, config: RemitterConfig) -> Self {
        Self {
            target,
            start,
            config,
            cycle: Mutex::new(RelayCycle::new()),
        }
    }

    #[cfg(test)]
    pub(crate) fn target(&self) -> &RelayTarget<K> {
        &self.target
    }

    pub(crate) fn phase(&self) -> RelayPhase {
        self.cycle.lock().phase()
    }

    /// Evaluates the activation predicate against `remitter`.
    pub(crate) fn is_demanded(&self, remitter: &Remitter<K, V>) -> bool {
        match &self.target {
            RelayTarget::Event(event) => remitter.has(event) || remitter.has_any(),
            RelayTarget::Any => remitter.has_listeners(),
        }
    }

    fn wants_start(&self) -> bool {
        let cycle = self.cycle.lock();
        !cycle.is_retired() && matches!(cycle.phase(), RelayPhase::Inactive | RelayPhase::Stopping)
    }

    pub(crate) fn start(self: &Arc<Self>, remitter: &Remitter<K, V>) {
        if !self.cycle.lock().begin_start() {
            return;
        }
        tracing::debug!(event = %self.target, "starting relay");

        let relay = guard::call_or_unwind(
            self.config.catch_panics,
            || (self.start)(remitter),
            || self.settle(None, Some(remitter)),
        )
        .unwrap_or_else(Relay::Failed);

        match relay {
            Relay::Ready(disposer) => self.settle(disposer, Some(remitter)),
            Relay::Failed(err) => {
                remitter.report(RemitterError::relay_start(&self.target.name(), err));
                self.settle(None, Some(remitter));
            }
            Relay::Pending(fut) => {
                let entry = Arc::clone(self);
                let owner = remitter.downgrade();
                guard::spawn_guarded(fut, move |outcome| {
                    let remitter = owner.upgrade();
                    let disposer = match outcome {
                        Ok(disposer) => disposer,
                        Err(err) => {
                            entry.report(
                                remitter.as_ref(),
                                RemitterError::relay_start(&entry.target.name(), err),
                            );
                            None
                        }
                    };
                    entry.settle(disposer, remitter.as_ref());
                });
            }
        }
    }

    pub(crate) fn stop(&self, remitter: &Remitter<K, V>) {
        let due = self.cycle.lock().begin_stop();
        self.finish_stop(due, Some(remitter));
    }

    /// Stops the relay for good; it will never start again.
    pub(crate) fn retire(&self, remitter: Option<&Remitter<K, V>>) {
        let due = self.cycle.lock().retire();
        self.finish_stop(due, remitter);
    }

    /// Records the start outcome; `remitter == None` means the owner is gone.
    fn settle(&self, disposer: Option<Disposer>, remitter: Option<&Remitter<K, V>>) {
        let due = {
            let mut cycle = self.cycle.lock();
            if remitter.is_none() {
                cycle.retire();
            }
            cycle.settle(disposer)
        };
        if due.is_some() {
            tracing::debug!(event = %self.target, "running deferred relay stop");
        }
        self.finish_stop(due, remitter);
    }

    fn finish_stop(&self, due: Option<Disposer>, remitter: Option<&Remitter<K, V>>) {
        let Some(disposer) = due else {
            return;
        };
        tracing::debug!(event = %self.target, "stopping relay");

        if let Err(err) = guard::call(self.config.catch_panics, || disposer.dispose()) {
            self.report(remitter, RemitterError::relay_stop(&self.target.name(), err));
        }
    }

    /// Routes `err` to the owner's error channel, or the default sink if it is gone.
    fn report(&self, remitter: Option<&Remitter<K, V>>, err: RemitterError) {
        match remitter {
            Some(remitter) => remitter.report(err),
            None => sink::unhandled(&self.config, &err),
        }
    }
}

/// The relay set of one remitter.
pub(crate) struct RelayManager<K: EventKey, V: Send + Sync + 'static> {
    config: RemitterConfig,
    entries: Mutex<Vec<Arc<RelayEntry<K, V>>>>,
}

impl<K, V> RelayManager<K, V>
where
    K: EventKey,
    V: Send + Sync + 'static,
{
    pub(crate) fn new(config: RemitterConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn register(&self, target: RelayTarget<K>, start: Box<StartFn<K, V>>) -> Arc<RelayEntry<K, V>> {
        let entry = Arc::new(RelayEntry::new(target, start, self.config.clone()));
        self.entries.lock().push(Arc::clone(&entry));
        entry
    }

    pub(crate) fn unregister(&self, entry: &Arc<RelayEntry<K, V>>) -> bool {
        let mut entries = self.entries.lock();
        match entries.iter().position(|e| Arc::ptr_eq(e, entry)) {
            Some(pos) => {
                entries.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Removes and returns every entry.
    pub(crate) fn drain(&self) -> Vec<Arc<RelayEntry<K, V>>> {
        std::mem::take(&mut *self.entries.lock())
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }

    fn snapshot(&self) -> Vec<Arc<RelayEntry<K, V>>> {
        self.entries.lock().clone()
    }

    /// Starts every idle relay whose predicate now holds, in registration order.
    pub(crate) fn try_start_all(&self, remitter: &Remitter<K, V>) {
        for entry in self.snapshot() {
            if entry.wants_start() && entry.is_demanded(remitter) {
                entry.start(remitter);
            }
        }
    }

    /// Stops every running relay whose predicate no longer holds.
    pub(crate) fn try_stop_all(&self, remitter: &Remitter<K, V>) {
        for entry in self.snapshot() {
            if matches!(entry.phase(), RelayPhase::Starting | RelayPhase::Active)
                && !entry.is_demanded(remitter)
            {
                entry.stop(remitter);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listeners::Listener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_test::traced_test;

    type R = Remitter<&'static str, u32>;

    fn counting_start(starts: &Arc<AtomicUsize>, stops: &Arc<AtomicUsize>) -> Box<StartFn<&'static str, u32>> {
        let starts = Arc::clone(starts);
        let stops = Arc::clone(stops);
        Box::new(move |_: &R| {
            starts.fetch_add(1, Ordering::SeqCst);
            let stops = Arc::clone(&stops);
            Relay::ready(Disposer::new(move || {
                stops.fetch_add(1, Ordering::SeqCst);
            }))
        })
    }

    #[test]
    fn test_predicate_per_target() {
        let remitter = R::new();
        let manager: RelayManager<&'static str, u32> = RelayManager::new(RemitterConfig::default());
        let named = manager.register(RelayTarget::Event("a"), Box::new(|_: &R| Relay::none()));
        let any = manager.register(RelayTarget::Any, Box::new(|_: &R| Relay::none()));
        assert_eq!(manager.len(), 2);

        assert!(!named.is_demanded(&remitter));
        assert!(!any.is_demanded(&remitter));

        let b = remitter.on("b", Listener::new(|_: &u32| {}));
        assert!(!named.is_demanded(&remitter));
        assert!(any.is_demanded(&remitter));
        b.dispose();

        let _e = remitter.on_error(Listener::new(|_: &RemitterError| {}));
        assert!(!named.is_demanded(&remitter));
        assert!(any.is_demanded(&remitter));

        let _w = remitter.on_any(Listener::new(|_: &crate::AnyEvent<&'static str, u32>| {}));
        assert!(named.is_demanded(&remitter));
    }

    #[test]
    fn test_start_and_stop_follow_predicate() {
        let remitter = R::new();
        let manager: RelayManager<&'static str, u32> = RelayManager::new(RemitterConfig::default());
        let (starts, stops) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        let entry = manager.register(RelayTarget::Event("a"), counting_start(&starts, &stops));

        manager.try_start_all(&remitter);
        assert_eq!(starts.load(Ordering::SeqCst), 0);

        let off = remitter.on("a", Listener::new(|_: &u32| {}));
        manager.try_start_all(&remitter);
        manager.try_start_all(&remitter);
        assert_eq!(starts.load(Ordering::SeqCst), 1);
        assert_eq!(entry.phase(), RelayPhase::Active);

        off.dispose();
        manager.try_stop_all(&remitter);
        manager.try_stop_all(&remitter);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert_eq!(entry.phase(), RelayPhase::Inactive);
    }

    #[test]
    fn test_retire_is_terminal() {
        let remitter = R::new();
        let manager: RelayManager<&'static str, u32> = RelayManager::new(RemitterConfig::default());
        let (starts, stops) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        let entry = manager.register(RelayTarget::Event("a"), counting_start(&starts, &stops));
        let _l = remitter.on("a", Listener::new(|_: &u32| {}));

        entry.start(&remitter);
        assert!(manager.unregister(&entry));
        assert!(!manager.unregister(&entry));
        entry.retire(Some(&remitter));
        entry.retire(Some(&remitter));
        entry.start(&remitter);

        assert_eq!(starts.load(Ordering::SeqCst), 1);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert_eq!(manager.drain().len(), 0);
    }

    #[test]
    fn test_panicking_start_is_reported_and_settles_empty() {
        let remitter = R::new();
        let labels = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&labels);
        let _e = remitter.on_error(Listener::new(move |err: &RemitterError| {
            sink.lock().push(err.as_label());
        }));

        let manager: RelayManager<&'static str, u32> = RelayManager::new(RemitterConfig::default());
        let entry = manager.register(RelayTarget::Any, Box::new(|_: &R| -> Relay { panic!("no start") }));
        entry.start(&remitter);

        assert_eq!(*labels.lock(), vec!["relay_start_failed"]);
        assert_eq!(entry.phase(), RelayPhase::Active);
        assert_eq!(entry.target(), &RelayTarget::Any);
        assert_eq!(entry.target().to_string(), "ANY_EVENT");
    }

    #[test]
    fn test_uncaught_start_panic_still_settles() {
        let remitter = R::with_config(RemitterConfig {
            catch_panics: false,
            ..RemitterConfig::default()
        });
        let manager: RelayManager<&'static str, u32> = RelayManager::new(remitter.config().clone());
        let entry = manager.register(RelayTarget::Event("a"), Box::new(|_: &R| -> Relay { panic!("loud") }));
        let _l = remitter.on("a", Listener::new(|_: &u32| {}));

        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| entry.start(&remitter)));
        assert!(res.is_err());
        assert_eq!(entry.phase(), RelayPhase::Active);

        entry.stop(&remitter);
        assert_eq!(entry.phase(), RelayPhase::Inactive);
    }

    #[traced_test]
    #[test]
    fn test_stop_after_owner_gone_uses_owner_config() {
        let manager: RelayManager<&'static str, u32> = RelayManager::new(RemitterConfig {
            log_unhandled: false,
            ..RemitterConfig::default()
        });
        let entry = manager.register(
            RelayTarget::Event("a"),
            Box::new(|_: &R| Relay::ready(Disposer::new(|| panic!("quiet please")))),
        );
        let remitter = R::new();
        let _l = remitter.on("a", Listener::new(|_: &u32| {}));
        entry.start(&remitter);

        entry.retire(None);
        assert_eq!(entry.phase(), RelayPhase::Inactive);
        assert!(!logs_contain("quiet please"));
    }
}
