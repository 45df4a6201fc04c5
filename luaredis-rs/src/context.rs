//! Per-call execution context.
//!
//! Every [`Store`](crate::store::Store) command takes a `&CallContext`.  The
//! Lua adapter always passes [`CallContext::background`], which leaves the
//! `redis` client's own defaults in force; Rust callers driving a store
//! directly may bound a call with [`CallContext::with_timeout`].

use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallContext {
    timeout: Option<Duration>,
}

impl CallContext {
    /// No deadline: block until the server answers.
    pub fn background() -> Self {
        Self::default()
    }

    /// Bound connect, read and write of a single call.  A zero duration is
    /// treated as no timeout, matching the socket APIs underneath.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: (!timeout.is_zero()).then_some(timeout),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}
