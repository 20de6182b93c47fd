//! Listener handles and the registry that owns them.
//!
//! ## Architecture
//! ```text
//! on(e, l)    ──► ListenerRegistry::add_named(e, l)   ──► first? ──► RelayManager::try_start_all
//! once(e, l)  ──► once::wrap(l) ─► add_named(e, w) + OnceTable::record(e, l → w)
//! off(e, l)   ──► ListenerRegistry::remove(e, l)      ──► emptied? ──► RelayManager::try_stop_all
//!                   └─► also removes every w recorded for (e, l)
//! emit(e, x)  ──► snapshot_named(e) ─► invoke each    ──► snapshot_any() ─► invoke each
//! ```
//!
//! - [`Listener`]: cloneable handle; identity is its [`ListenerId`].
//! - `ListenerSet`: insertion-ordered, unique, snapshot-on-iterate.
//! - `ListenerRegistry`: per-event sets with the "key present ⇒ non-empty" invariant.
//! - `once`: one-shot wrappers and their side table.

mod listener;
pub(crate) mod once;
mod registry;
mod set;

pub use listener::{Listener, ListenerId};

pub(crate) use listener::Invocation;
pub(crate) use registry::ListenerRegistry;
