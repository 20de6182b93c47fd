//! Event names and the wildcard payload.
//!
//! ## Contents
//! - `EventName` registry key: a user event name or one of the two sentinels
//! - [`AnyEvent`] payload delivered to `ANY_EVENT` listeners
//! - [`EventKey`] bound required from user event-name types
//!
//! The sentinels are enum variants rather than reserved strings, so a user
//! event name can never collide with `ANY_EVENT` or `ERROR_EVENT`.

mod name;

pub use name::{AnyEvent, EventKey};

pub(crate) use name::EventName;
