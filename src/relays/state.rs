//! # Relay lifecycle state machine.
//!
//! ```text
//!             begin_start                settle(d)
//!  Inactive ─────────────► Starting ───────────────► Active(d)
//!     ▲                     │    ▲                     │
//!     │          begin_stop │    │ begin_start         │ begin_stop
//!     │                     ▼    │                     │   (returns d)
//!     └──────────────────── Stopping ◄─────────────────┘ (d known: straight to Inactive)
//!          settle(d)
//!        (returns d)
//! ```
//!
//! The disposer slot is an explicit tagged variant ([`DisposerState`]):
//! - `Absent`: nothing running (`Inactive`);
//! - `Pending { stop_requested }`: the start function has not settled yet
//!   (`Starting`, or `Stopping` once a stop was requested);
//! - `Resolved(d)`: started; `d` is the disposer, if any (`Active`).
//!
//! ## Rules
//! - at most one start/stop cycle is in flight: `begin_start` while `Pending`
//!   never calls the start function again, it only withdraws a stop request;
//! - a stop while `Pending` is deferred to `settle`, which hands the disposer
//!   back for invocation: the disposer is never dropped and never run twice;
//! - a retired cycle (relay removed or owner gone) never starts again and
//!   disposes as soon as its disposer is known.

use crate::disposer::Disposer;

/// Disposer slot of one relay.
#[derive(Debug)]
pub(crate) enum DisposerState {
    Absent,
    Pending { stop_requested: bool },
    Resolved(Option<Disposer>),
}

/// Observable lifecycle phase, derived from [`DisposerState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RelayPhase {
    Inactive,
    Starting,
    Active,
    Stopping,
}

#[derive(Debug)]
pub(crate) struct RelayCycle {
    state: DisposerState,
    retired: bool,
}

impl RelayCycle {
    pub(crate) fn new() -> Self {
        Self {
            state: DisposerState::Absent,
            retired: false,
        }
    }

    pub(crate) fn phase(&self) -> RelayPhase {
        match self.state {
            DisposerState::Absent => RelayPhase::Inactive,
            DisposerState::Pending {
                stop_requested: false,
            } => RelayPhase::Starting,
            DisposerState::Pending {
                stop_requested: true,
            } => RelayPhase::Stopping,
            DisposerState::Resolved(_) => RelayPhase::Active,
        }
    }

    pub(crate) fn is_retired(&self) -> bool {
        self.retired
    }

    /// Returns `true` when the caller must now invoke the start function.
    pub(crate) fn begin_start(&mut self) -> bool {
        if self.retired {
            return false;
        }
        match &mut self.state {
            DisposerState::Absent => {
                self.state = DisposerState::Pending {
                    stop_requested: false,
                };
                true
            }
            DisposerState::Pending { stop_requested } => {
                *stop_requested = false;
                false
            }
            DisposerState::Resolved(_) => false,
        }
    }

    /// Returns the disposer to invoke now, if it is already known.
    ///
    /// A pending start only records the request; [`settle`](Self::settle)
    /// completes the stop.
    pub(crate) fn begin_stop(&mut self) -> Option<Disposer> {
        match &mut self.state {
            DisposerState::Absent => None,
            DisposerState::Pending { stop_requested } => {
                *stop_requested = true;
                None
            }
            DisposerState::Resolved(disposer) => {
                let disposer = disposer.take();
                self.state = DisposerState::Absent;
                disposer
            }
        }
    }

    /// Records the start outcome; returns the disposer if it must run now.
    pub(crate) fn settle(&mut self, disposer: Option<Disposer>) -> Option<Disposer> {
        match self.state {
            DisposerState::Pending {
                stop_requested: false,
            } if !self.retired => {
                self.state = DisposerState::Resolved(disposer);
                None
            }
            // Stop requested, retired, or an outcome nobody waits for.
            _ => {
                if matches!(self.state, DisposerState::Pending { .. }) {
                    self.state = DisposerState::Absent;
                }
                disposer
            }
        }
    }

    /// Marks the cycle as terminal; returns the disposer if it must run now.
    pub(crate) fn retire(&mut self) -> Option<Disposer> {
        self.retired = true;
        self.begin_stop()
    }
}

impl Default for RelayCycle {
    fn default() -> Self {
        Self::new()
    }
}
