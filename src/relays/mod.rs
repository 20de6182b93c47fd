//! Relays: side effects that run only while an event has listeners.
//!
//! A relay is a `(target, start)` pair registered with
//! [`Remitter::remit`](crate::Remitter::remit) or
//! [`Remitter::remit_any`](crate::Remitter::remit_any). `start` runs when the
//! target's activation predicate becomes true (first listener) and the
//! disposer it produced runs when the predicate becomes false (last listener
//! gone), when the relay is disposed, or when the remitter is disposed.
//!
//! - [`Relay`]: what a start function returns (ready, pending, failed).
//! - `state`: the explicit `Inactive → Starting → Active → Stopping` machine.
//! - `manager`: relay entries, activation predicate, start/stop dispatch.

mod manager;
mod relay;
mod state;

pub use relay::Relay;

pub(crate) use manager::{RelayManager, RelayTarget};
