//! # Relay start outcome (`Relay`)
//!
//! A relay start function reports what it started through [`Relay`]:
//! - `Ready(Some(d))`: started synchronously; `d` undoes it;
//! - `Ready(None)`: nothing to undo;
//! - `Pending(fut)`: still starting; `fut` resolves to the disposer;
//! - `Failed(err)`: start failed; reported, and treated as `Ready(None)`.
//!
//! Start functions may return anything `Into<Relay>`: a [`Disposer`], `()`,
//! `Option<Disposer>` or `Result<Disposer, E>`. A future resolving to another
//! future is not expressible.
//!
//! ## Example
//! ```rust
//! use remitter::{Disposer, Relay};
//!
//! let ready: Relay = Disposer::noop().into();
//! assert!(matches!(ready, Relay::Ready(Some(_))));
//!
//! let pending = Relay::pending(async { Ok(Some(Disposer::noop())) });
//! assert!(matches!(pending, Relay::Pending(_)));
//! ```

use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::disposer::Disposer;

/// What a relay start function produced.
pub enum Relay {
    /// Started; the optional disposer stops it.
    Ready(Option<Disposer>),
    /// Start in flight; resolves to the disposer.
    Pending(BoxFuture<'static, anyhow::Result<Option<Disposer>>>),
    /// Start failed.
    Failed(anyhow::Error),
}

impl Relay {
    /// Started with nothing to undo.
    pub fn none() -> Self {
        Relay::Ready(None)
    }

    /// Started; `disposer` stops it.
    pub fn ready(disposer: Disposer) -> Self {
        Relay::Ready(Some(disposer))
    }

    /// Start completes when `fut` resolves. The future is driven on the current
    /// tokio runtime, independently of listener activity.
    pub fn pending<Fut>(fut: Fut) -> Self
    where
        Fut: Future<Output = anyhow::Result<Option<Disposer>>> + Send + 'static,
    {
        Relay::Pending(fut.boxed())
    }

    /// Start failed with `err`.
    pub fn failed(err: impl Into<anyhow::Error>) -> Self {
        Relay::Failed(err.into())
    }
}

impl From<Disposer> for Relay {
    fn from(disposer: Disposer) -> Self {
        Relay::ready(disposer)
    }
}

impl From<Option<Disposer>> for Relay {
    fn from(disposer: Option<Disposer>) -> Self {
        Relay::Ready(disposer)
    }
}

impl From<()> for Relay {
    fn from(_: ()) -> Self {
        Relay::none()
    }
}

impl<E: Into<anyhow::Error>> From<Result<Disposer, E>> for Relay {
    fn from(res: Result<Disposer, E>) -> Self {
        match res {
            Ok(disposer) => Relay::ready(disposer),
            Err(err) => Relay::failed(err),
        }
    }
}

impl fmt::Debug for Relay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relay::Ready(d) => f.debug_tuple("Ready").field(d).finish(),
            Relay::Pending(_) => f.write_str("Pending(..)"),
            Relay::Failed(err) => f.debug_tuple("Failed").field(err).finish(),
        }
    }
}
