//! # Default sink for unhandled errors.
//!
//! Used when no `ERROR_EVENT` listener is registered, when an error listener
//! itself fails (so error dispatch never recurses), and when the owning
//! remitter is already gone by the time a detached failure settles.

use crate::config::RemitterConfig;
use crate::error::RemitterError;

/// Logs `err` through `tracing` unless `config.log_unhandled` is off.
pub(crate) fn unhandled(config: &RemitterConfig, err: &RemitterError) {
    if !config.log_unhandled {
        return;
    }
    tracing::error!(
        label = err.as_label(),
        event = err.event(),
        "unhandled remitter error: {}",
        err.as_message()
    );
}
