//! # Subscription-only view of a remitter.
//!
//! [`EventReceiver`] exposes listener management and queries, but not `emit`,
//! `remit` or `dispose`. Hand it to consumers that must observe events without
//! being able to produce them.

use std::fmt;

use crate::disposer::Disposer;
use crate::error::RemitterError;
use crate::events::{AnyEvent, EventKey};
use crate::listeners::Listener;
use crate::remitter::Remitter;

/// Read side of a [`Remitter`]; obtained from [`Remitter::receiver`].
pub struct EventReceiver<K: EventKey, V: Send + Sync + 'static = ()> {
    remitter: Remitter<K, V>,
}

impl<K, V> EventReceiver<K, V>
where
    K: EventKey,
    V: Send + Sync + 'static,
{
    pub(crate) fn new(remitter: Remitter<K, V>) -> Self {
        Self { remitter }
    }

    pub fn on(&self, event: K, listener: Listener<V>) -> Disposer {
        self.remitter.on(event, listener)
    }

    pub fn once(&self, event: K, listener: Listener<V>) -> Disposer {
        self.remitter.once(event, listener)
    }

    pub fn on_any(&self, listener: Listener<AnyEvent<K, V>>) -> Disposer {
        self.remitter.on_any(listener)
    }

    pub fn once_any(&self, listener: Listener<AnyEvent<K, V>>) -> Disposer {
        self.remitter.once_any(listener)
    }

    pub fn on_error(&self, listener: Listener<RemitterError>) -> Disposer {
        self.remitter.on_error(listener)
    }

    pub fn once_error(&self, listener: Listener<RemitterError>) -> Disposer {
        self.remitter.once_error(listener)
    }

    pub fn off(&self, event: &K, listener: &Listener<V>) -> bool {
        self.remitter.off(event, listener)
    }

    pub fn off_any(&self, listener: &Listener<AnyEvent<K, V>>) -> bool {
        self.remitter.off_any(listener)
    }

    pub fn off_error(&self, listener: &Listener<RemitterError>) -> bool {
        self.remitter.off_error(listener)
    }

    pub fn clear(&self, event: &K) {
        self.remitter.clear(event);
    }

    pub fn clear_any(&self) {
        self.remitter.clear_any();
    }

    pub fn clear_error(&self) {
        self.remitter.clear_error();
    }

    pub fn has(&self, event: &K) -> bool {
        self.remitter.has(event)
    }

    pub fn has_any(&self) -> bool {
        self.remitter.has_any()
    }

    pub fn has_error(&self) -> bool {
        self.remitter.has_error()
    }

    pub fn has_listeners(&self) -> bool {
        self.remitter.has_listeners()
    }

    #[deprecated(note = "use `has` instead")]
    #[allow(deprecated)]
    pub fn count(&self, event: &K) -> usize {
        self.remitter.count(event)
    }
}

impl<K: EventKey, V: Send + Sync + 'static> Clone for EventReceiver<K, V> {
    fn clone(&self) -> Self {
        Self {
            remitter: self.remitter.clone(),
        }
    }
}

impl<K: EventKey, V: Send + Sync + 'static> fmt::Debug for EventReceiver<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventReceiver").field(&self.remitter).finish()
    }
}
