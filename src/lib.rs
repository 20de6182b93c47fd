//! # remitter
//!
//! **Remitter** is a typed, in-process event emitter for Rust.
//!
//! Besides plain publish/subscribe it manages **relays**: side effects that
//! run only while an event has at least one listener. A relay starts when the
//! first listener arrives and stops when the last one leaves.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   on / once / off / clear                 emit(e, x)
//!            │                                   │
//!            ▼                                   ▼
//! ┌──────────────────────────────┐   ┌──────────────────────────────┐
//! │  ListenerRegistry            │◄──┤  Dispatch                    │
//! │  - named: K → ListenerSet<V> │   │  - snapshot(e), invoke &x    │
//! │  - any:   ListenerSet<Any..> │   │  - snapshot(ANY), invoke     │
//! │  - error: ListenerSet<Err>   │   │    &AnyEvent { e, x }        │
//! │  - once:  OnceTable          │   │  - guard each call           │
//! └──────────────┬───────────────┘   └──────────────┬───────────────┘
//!                │ 0 → 1 / 1 → 0                    │ panic / Err / failed future
//!                ▼                                  ▼
//! ┌──────────────────────────────┐   ┌──────────────────────────────┐
//! │  RelayManager                │   │  Error channel               │
//! │  - RelayEntry per remit()    ├──►│  - ERROR_EVENT listeners     │
//! │  - RelayCycle state machine  │   │  - else tracing::error!      │
//! └──────────────────────────────┘   └──────────────────────────────┘
//! ```
//!
//! ### Relay lifecycle
//! ```text
//! remit(e, start)
//!   └─► predicate(e) = has(e) || has(ANY_EVENT)
//!
//! Inactive ──(predicate true)──► Starting ──(start settles)──► Active(disposer)
//!    ▲                              │                            │
//!    │                   (predicate false: deferred)   (predicate false)
//!    │                              ▼                            │
//!    └───────(settle: run disposer)─ Stopping                    │
//!    └───────────────────────(run disposer)──────────────────────┘
//! ```
//!
//! ## Features
//! | Area              | Description                                                     | Key types                                |
//! |-------------------|-----------------------------------------------------------------|------------------------------------------|
//! | **Emitter**       | Typed emit / on / once / off, wildcard and error channels.      | [`Remitter`], [`Listener`], [`AnyEvent`] |
//! | **Relays**        | Side effects started on first listener, stopped on last.        | [`Relay`], [`Disposer`]                  |
//! | **Read side**     | Subscription-only view for consumers.                           | [`EventReceiver`]                        |
//! | **Errors**        | Typed errors delivered on `ERROR_EVENT`.                        | [`RemitterError`]                        |
//! | **Configuration** | Panic isolation and default-sink logging.                       | [`RemitterConfig`]                       |
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use remitter::{AnyEvent, Disposer, Listener, Remitter};
//!
//! #[derive(Clone, Debug, PartialEq, Eq, Hash)]
//! enum Ev {
//!     Connected,
//!     Message,
//! }
//!
//! let bus: Remitter<Ev, String> = Remitter::new();
//! let log = Arc::new(Mutex::new(Vec::new()));
//!
//! // Runs only while somebody listens for messages.
//! let l = Arc::clone(&log);
//! bus.remit(Ev::Message, move |_: &Remitter<Ev, String>| {
//!     l.lock().unwrap().push("socket open".to_string());
//!     let l = Arc::clone(&l);
//!     Disposer::new(move || l.lock().unwrap().push("socket closed".to_string()))
//! });
//!
//! let l = Arc::clone(&log);
//! let off = bus.on(Ev::Message, Listener::new(move |m: &String| l.lock().unwrap().push(m.clone())));
//!
//! let l = Arc::clone(&log);
//! bus.on_any(Listener::new(move |e: &AnyEvent<Ev, String>| {
//!     l.lock().unwrap().push(format!("{:?}", e.event));
//! }));
//!
//! bus.emit(Ev::Message, "hi".to_string());
//! bus.emit(Ev::Connected, String::new());
//! off.dispose();
//! bus.dispose();
//!
//! assert_eq!(
//!     *log.lock().unwrap(),
//!     vec!["socket open", "hi", "Message", "Connected", "socket closed"],
//! );
//! ```

mod config;
mod dispatch;
mod disposer;
mod error;
mod events;
mod listeners;
mod receiver;
mod relays;
mod remitter;

// ---- Public re-exports ----

pub use config::RemitterConfig;
pub use disposer::Disposer;
pub use error::RemitterError;
pub use events::{AnyEvent, EventKey};
pub use listeners::{Listener, ListenerId};
pub use receiver::EventReceiver;
pub use relays::Relay;
pub use remitter::Remitter;
