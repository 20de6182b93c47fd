//! # Registry keys and wildcard payloads.
//!
//! Every listener set is keyed by an [`EventName`]:
//! - `Named(k)`: a user event name;
//! - `Any`: the wildcard sentinel (`ANY_EVENT`), re-broadcast target of every emit;
//! - `Error`: the error sentinel (`ERROR_EVENT`), receives caught failures.
//!
//! Only `Named` keys are visible to users; the sentinels are reached through
//! the `_any` / `_error` methods of [`Remitter`](crate::Remitter).

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Bound for user event-name types.
///
/// Blanket-implemented; any cloneable, hashable, debuggable, thread-safe value
/// qualifies (string literals, `String`, fieldless enums, integers).
pub trait EventKey: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> EventKey for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// Key of a listener set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum EventName<K> {
    /// A user-declared event name.
    Named(K),
    /// Wildcard sentinel: listeners receive every emitted event.
    Any,
    /// Error sentinel: listeners receive otherwise-unhandled failures.
    Error,
}

impl<K: Debug> fmt::Display for EventName<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventName::Named(k) => write!(f, "{k:?}"),
            EventName::Any => f.write_str("ANY_EVENT"),
            EventName::Error => f.write_str("ERROR_EVENT"),
        }
    }
}

/// Payload received by `ANY_EVENT` listeners: the originating event and its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnyEvent<K, V> {
    /// Name the event was emitted under.
    pub event: K,
    /// Payload the event was emitted with.
    pub data: V,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sentinels_never_equal_user_names() {
        let names: HashSet<EventName<String>> = [
            EventName::Named("ANY_EVENT".to_string()),
            EventName::Named("ERROR_EVENT".to_string()),
            EventName::Any,
            EventName::Error,
        ]
        .into_iter()
        .collect();
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(EventName::Named("ready").to_string(), "\"ready\"");
        assert_eq!(EventName::<u8>::Any.to_string(), "ANY_EVENT");
        assert_eq!(EventName::<u8>::Error.to_string(), "ERROR_EVENT");
    }
}
