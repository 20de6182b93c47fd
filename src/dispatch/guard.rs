//! # Panic isolation and detached work.
//!
//! ## Panic handling
//! [`call`] uses `catch_unwind` to isolate a synchronous call:
//! - the panic payload is converted into an `anyhow::Error` (`"panicked: <msg>"`);
//! - the caller continues with the next listener.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state
//! inconsistent if user code panics while holding a lock of its own.
//!
//! ## Detached futures
//! [`spawn_guarded`] drives a future on the ambient tokio runtime and hands its
//! outcome (panics converted to errors) to a completion callback. Without a
//! runtime the future is dropped unpolled and the callback receives an error.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use anyhow::anyhow;
use futures::FutureExt;

/// Runs `f`, converting a panic into an error when `catch_panics` is set.
///
/// With `catch_panics == false` a panic propagates to the caller unchanged.
pub(crate) fn call<R>(catch_panics: bool, f: impl FnOnce() -> R) -> anyhow::Result<R> {
    if !catch_panics {
        return Ok(f());
    }
    std::panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| panicked(&*payload))
}

/// Like [`call`], but runs `unwind` before letting a panic through.
///
/// Only matters with `catch_panics == false`: the caller gets to restore its
/// own state before the panic leaves it.
pub(crate) fn call_or_unwind<R>(
    catch_panics: bool,
    f: impl FnOnce() -> R,
    unwind: impl FnOnce(),
) -> anyhow::Result<R> {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Ok(value),
        Err(payload) if catch_panics => Err(panicked(&*payload)),
        Err(payload) => {
            unwind();
            std::panic::resume_unwind(payload)
        }
    }
}

/// Spawns `fut` on the current tokio runtime; `done` receives its outcome.
///
/// `done` runs on the runtime after the future settles, or immediately (with
/// an error) when there is no runtime to spawn on.
pub(crate) fn spawn_guarded<T, Fut, D>(fut: Fut, done: D)
where
    T: Send + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    D: FnOnce(anyhow::Result<T>) + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                let outcome = match AssertUnwindSafe(fut).catch_unwind().await {
                    Ok(outcome) => outcome,
                    Err(payload) => Err(panicked(&*payload)),
                };
                done(outcome);
            });
        }
        Err(_) => done(Err(anyhow!("no tokio runtime to drive detached future"))),
    }
}

fn panicked(payload: &(dyn Any + Send)) -> anyhow::Error {
    anyhow!("panicked: {}", panic_message(payload))
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
