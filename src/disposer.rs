//! # Idempotent disposers
//!
//! A [`Disposer`] reverses a prior registration or activation: it is returned by
//! `on`/`once`/`remit`/`remit_any` and produced by relay start functions.
//!
//! ## Rules
//! - the wrapped action runs **at most once**, no matter how many clones call it;
//! - the action is taken out of the slot before it runs, so a panicking action
//!   still counts as disposed;
//! - no lock is held while the action runs (it may re-enter the remitter).

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

type DisposeFn = Box<dyn FnOnce() + Send>;

/// Cloneable, idempotent zero-argument teardown action.
///
/// # Example
/// ```
/// use remitter::Disposer;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let calls = Arc::new(AtomicUsize::new(0));
/// let c = Arc::clone(&calls);
/// let disposer = Disposer::new(move || { c.fetch_add(1, Ordering::SeqCst); });
///
/// assert!(disposer.clone().dispose());
/// assert!(!disposer.dispose());
/// assert_eq!(calls.load(Ordering::SeqCst), 1);
/// ```
#[derive(Clone)]
pub struct Disposer {
    slot: Arc<Mutex<Option<DisposeFn>>>,
}

impl Disposer {
    /// Wraps `f` so that it runs on the first [`dispose`](Self::dispose) only.
    pub fn new(f: impl FnOnce() + Send + 'static) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(Box::new(f)))),
        }
    }

    /// A disposer that has nothing to undo.
    pub fn noop() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Runs the teardown action if it has not run yet.
    ///
    /// Returns `true` if this call performed the disposal.
    pub fn dispose(&self) -> bool {
        let action = self.slot.lock().take();
        match action {
            Some(f) => {
                f();
                true
            }
            None => false,
        }
    }

    /// `true` once the action has been taken (or if there never was one).
    pub fn is_disposed(&self) -> bool {
        self.slot.lock().is_none()
    }
}

impl fmt::Debug for Disposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposer")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_runs_once_across_clones() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let d = Disposer::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        let d2 = d.clone();

        assert!(!d.is_disposed());
        assert!(d2.dispose());
        assert!(!d.dispose());
        assert!(d.is_disposed());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_noop_is_already_disposed() {
        let d = Disposer::noop();
        assert!(d.is_disposed());
        assert!(!d.dispose());
    }

    #[test]
    fn test_action_may_reenter_its_own_disposer() {
        let slot: Arc<Mutex<Option<Disposer>>> = Arc::new(Mutex::new(None));
        let inner = Arc::clone(&slot);
        let d = Disposer::new(move || {
            if let Some(me) = inner.lock().as_ref() {
                assert!(!me.dispose());
            }
        });
        *slot.lock() = Some(d.clone());
        assert!(d.dispose());
    }

    #[test]
    fn test_panicking_action_counts_as_disposed() {
        let d = Disposer::new(|| panic!("teardown failed"));
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| d.dispose()));
        assert!(res.is_err());
        assert!(d.is_disposed());
        assert!(!d.dispose());
    }
}
