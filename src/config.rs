//! # Remitter configuration.
//!
//! Provides [`RemitterConfig`], the per-instance settings of a
//! [`Remitter`](crate::Remitter):
//!
//! ```rust
//! use remitter::{Remitter, RemitterConfig};
//!
//! let cfg = RemitterConfig { log_unhandled: false, ..RemitterConfig::default() };
//! let remitter: Remitter<&str, u32> = Remitter::with_config(cfg);
//! assert!(!remitter.config().log_unhandled);
//! ```

/// Per-instance settings.
///
/// ## Field semantics
/// - `catch_panics`: isolate panics raised by synchronous user code (`false` = propagate)
/// - `log_unhandled`: log errors nobody listens for via `tracing` (`false` = drop silently)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemitterConfig {
    /// Catch panics from listeners, relay start functions and relay disposers.
    ///
    /// - `true`: a panic becomes a [`RemitterError`](crate::RemitterError) and
    ///   dispatch continues with the next listener
    /// - `false`: the panic unwinds out of `emit`/`on`/`off`/... (fail-fast);
    ///   `Err` returns are still routed to the error channel
    ///
    /// Futures run detached are always guarded.
    pub catch_panics: bool,

    /// Forward errors to the default sink when no `ERROR_EVENT` listener exists.
    ///
    /// The default sink is `tracing::error!`; the library installs no subscriber.
    pub log_unhandled: bool,
}

impl Default for RemitterConfig {
    /// Default configuration:
    ///
    /// - `catch_panics = true` (one broken listener cannot break the bus)
    /// - `log_unhandled = true`
    fn default() -> Self {
        Self {
            catch_panics: true,
            log_unhandled: true,
        }
    }
}
