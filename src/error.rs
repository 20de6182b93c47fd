//! Error types delivered through the error channel.
//!
//! No public method of [`Remitter`](crate::Remitter) returns an error. Failures
//! raised by user code are caught at the dispatch/relay boundary, wrapped in a
//! [`RemitterError`] and handed to the `ERROR_EVENT` listeners (or the default
//! sink when there are none).
//!
//! Three failure sources exist:
//!
//! - [`RemitterError::Listener`]: a listener panicked, returned `Err`, or its
//!   detached future failed.
//! - [`RemitterError::RelayStart`]: a relay start function panicked or its
//!   start future failed.
//! - [`RemitterError::RelayStop`]: a relay disposer panicked.
//!
//! The helpers `as_label` / `as_message` mirror the style used for logs/metrics.

use std::fmt::Debug;

use thiserror::Error;

use crate::events::EventName;

/// # Errors caught while running user code.
///
/// Each variant carries a printable label of the event it belongs to and the
/// underlying cause as an [`anyhow::Error`].
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RemitterError {
    /// A listener failed while handling an emitted event.
    #[error("listener for {event} failed: {source}")]
    Listener {
        /// Label of the event being dispatched.
        event: String,
        /// What the listener raised.
        #[source]
        source: anyhow::Error,
    },

    /// A relay start function failed; the relay is treated as started without a disposer.
    #[error("relay start for {event} failed: {source}")]
    RelayStart {
        /// Label of the relay's target event.
        event: String,
        /// What the start function raised.
        #[source]
        source: anyhow::Error,
    },

    /// A relay disposer failed while stopping the relay.
    #[error("relay stop for {event} failed: {source}")]
    RelayStop {
        /// Label of the relay's target event.
        event: String,
        /// What the disposer raised.
        #[source]
        source: anyhow::Error,
    },
}

impl RemitterError {
    pub(crate) fn listener<K: Debug>(event: &EventName<K>, source: anyhow::Error) -> Self {
        Self::Listener {
            event: event.to_string(),
            source,
        }
    }

    pub(crate) fn relay_start<K: Debug>(event: &EventName<K>, source: anyhow::Error) -> Self {
        Self::RelayStart {
            event: event.to_string(),
            source,
        }
    }

    pub(crate) fn relay_stop<K: Debug>(event: &EventName<K>, source: anyhow::Error) -> Self {
        Self::RelayStop {
            event: event.to_string(),
            source,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use remitter::{Listener, Remitter, RemitterError};
    /// use std::sync::{Arc, Mutex};
    ///
    /// let remitter: Remitter<&'static str, u32> = Remitter::new();
    /// let labels = Arc::new(Mutex::new(Vec::new()));
    /// let sink = Arc::clone(&labels);
    /// remitter.on_error(Listener::new(move |err: &RemitterError| {
    ///     sink.lock().unwrap().push(err.as_label());
    /// }));
    /// remitter.on("tick", Listener::fallible(|_: &u32| Err(anyhow::anyhow!("boom"))));
    /// remitter.emit("tick", 1);
    ///
    /// assert_eq!(*labels.lock().unwrap(), vec!["listener_failed"]);
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RemitterError::Listener { .. } => "listener_failed",
            RemitterError::RelayStart { .. } => "relay_start_failed",
            RemitterError::RelayStop { .. } => "relay_stop_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RemitterError::Listener { event, source } => {
                format!("listener error on {event}: {source:#}")
            }
            RemitterError::RelayStart { event, source } => {
                format!("relay start error on {event}: {source:#}")
            }
            RemitterError::RelayStop { event, source } => {
                format!("relay stop error on {event}: {source:#}")
            }
        }
    }

    /// Label of the event the failure belongs to.
    pub fn event(&self) -> &str {
        match self {
            RemitterError::Listener { event, .. }
            | RemitterError::RelayStart { event, .. }
            | RemitterError::RelayStop { event, .. } => event,
        }
    }

    /// The underlying cause raised by user code.
    pub fn cause(&self) -> &anyhow::Error {
        match self {
            RemitterError::Listener { source, .. }
            | RemitterError::RelayStart { source, .. }
            | RemitterError::RelayStop { source, .. } => source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_labels_are_stable() {
        let name: EventName<&str> = EventName::Named("tick");
        let err = RemitterError::listener(&name, anyhow::anyhow!("boom"));
        assert_eq!(err.as_label(), "listener_failed");
        assert_eq!(err.event(), "\"tick\"");

        let err = RemitterError::relay_start(&EventName::<&str>::Any, anyhow::anyhow!("x"));
        assert_eq!(err.as_label(), "relay_start_failed");
        assert_eq!(err.event(), "ANY_EVENT");

        let err = RemitterError::relay_stop(&name, anyhow::anyhow!("x"));
        assert_eq!(err.as_label(), "relay_stop_failed");
    }

    #[test]
    fn test_display_and_source_chain() {
        let name: EventName<&str> = EventName::Named("tick");
        let err = RemitterError::relay_stop(&name, anyhow::anyhow!("disk gone"));

        assert_eq!(err.to_string(), "relay stop for \"tick\" failed: disk gone");
        assert_eq!(err.cause().to_string(), "disk gone");
        assert!(err.source().is_some());
        assert!(err.as_message().contains("disk gone"));
    }
}
