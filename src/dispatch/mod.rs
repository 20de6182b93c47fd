//! Error isolation around user code.
//!
//! Every listener call, relay start and relay disposer goes through the same
//! wrapper: run it, catch a panic, turn an `Err` into a [`RemitterError`](crate::RemitterError),
//! and hand any returned future to the runtime with the same guard applied.
//! Nothing caught here is ever re-thrown into the caller of a public method.
//!
//! - [`guard`]: `catch_unwind` wrapper and detached-future spawning.
//! - [`sink`]: the default out-of-band sink used when no `ERROR_EVENT` listener exists.

pub(crate) mod guard;
pub(crate) mod sink;
