//! # Listener handles (`Listener<T>`)
//!
//! A [`Listener`] wraps a closure `Fn(&T)` behind an `Arc` together with a
//! process-unique [`ListenerId`]. Rust closures carry no identity of their own,
//! so the id stands in for "the same function reference": cloning a handle keeps
//! its id, and the registry compares listeners by id only.
//!
//! ## Flavours
//! - [`Listener::new`]: plain closure; a panic is reported as a listener error.
//! - [`Listener::fallible`]: closure returning `Result<(), E>`; `Err` is reported.
//! - [`Listener::future`]: closure returning a future that runs detached on the
//!   ambient tokio runtime; its `Err` or panic is reported when it settles.
//!
//! ## Example
//! ```rust
//! use remitter::Listener;
//!
//! let log = Listener::new(|n: &u32| println!("got {n}"));
//! let same = log.clone();
//! assert_eq!(log.id(), same.id());
//! assert_ne!(log.id(), Listener::new(|_: &u32| {}).id());
//! ```

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

/// Global counter for listener identities.
static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`Listener`]; shared by all clones of one handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value (for logs).
    pub fn get(self) -> u64 {
        self.0
    }
}

/// What a single listener call produced.
pub(crate) enum Invocation {
    /// Finished synchronously without error.
    Done,
    /// Finished synchronously with an error.
    Failed(anyhow::Error),
    /// Returned work that must run detached; errors surface when it settles.
    Detached(BoxFuture<'static, anyhow::Result<()>>),
}

type CallFn<T> = dyn Fn(&T) -> Invocation + Send + Sync;

/// Cloneable, identity-carrying listener for payloads of type `T`.
pub struct Listener<T> {
    id: ListenerId,
    call: Arc<CallFn<T>>,
}

impl<T: 'static> Listener<T> {
    /// Creates a listener from an infallible closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Self::with_id(ListenerId::next(), move |data| {
            f(data);
            Invocation::Done
        })
    }

    /// Creates a listener whose `Err` return is routed to the error channel.
    pub fn fallible<F, E>(f: F) -> Self
    where
        F: Fn(&T) -> Result<(), E> + Send + Sync + 'static,
        E: Into<anyhow::Error>,
    {
        Self::with_id(ListenerId::next(), move |data| match f(data) {
            Ok(()) => Invocation::Done,
            Err(e) => Invocation::Failed(e.into()),
        })
    }

    /// Creates a listener that starts a future per event.
    ///
    /// The future is spawned on the current tokio runtime and never awaited by
    /// `emit`. It must own whatever it needs from the payload.
    pub fn future<F, Fut>(f: F) -> Self
    where
        F: Fn(&T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::with_id(ListenerId::next(), move |data| {
            Invocation::Detached(f(data).boxed())
        })
    }

    pub(crate) fn with_id<F>(id: ListenerId, f: F) -> Self
    where
        F: Fn(&T) -> Invocation + Send + Sync + 'static,
    {
        Self {
            id,
            call: Arc::new(f),
        }
    }
}

impl<T> Listener<T> {
    /// Identity used by `off` and by the registry's uniqueness check.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub(crate) fn invoke(&self, data: &T) -> Invocation {
        (self.call)(data)
    }
}

impl<T> Clone for Listener<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            call: Arc::clone(&self.call),
        }
    }
}

impl<T> PartialEq for Listener<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Listener<T> {}

impl<T> fmt::Debug for Listener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("id", &self.id.0).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_plain_listener_runs_synchronously() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let l = Listener::new(move |n: &usize| {
            h.fetch_add(*n, Ordering::SeqCst);
        });

        assert!(matches!(l.invoke(&3), Invocation::Done));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_fallible_listener_reports_err() {
        let l = Listener::fallible(|n: &i32| {
            if *n < 0 {
                anyhow::bail!("negative: {n}");
            }
            Ok(())
        });

        assert!(matches!(l.invoke(&1), Invocation::Done));
        match l.invoke(&-1) {
            Invocation::Failed(e) => assert_eq!(e.to_string(), "negative: -1"),
            _ => panic!("expected failure"),
        }
    }

    #[test]
    fn test_future_listener_is_lazy() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let l = Listener::future(move |_: &()| {
            let h = Arc::clone(&h);
            async move {
                h.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        let Invocation::Detached(fut) = l.invoke(&()) else {
            panic!("expected detached work");
        };
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(futures::executor::block_on(fut).is_ok());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_identity_follows_clones() {
        let a = Listener::new(|_: &()| {});
        let b = a.clone();
        let c = Listener::new(|_: &()| {});
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(c.id() > a.id());
    }
}
