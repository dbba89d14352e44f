//! Cancellation and deadline propagation
//!
//! A [`RequestContext`] travels with every call into the executor, the login
//! collaborator and the transport. It carries a shared cancel flag and an
//! optional deadline; both are checked between steps and while the network
//! call is in flight.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

use crate::error::RequestError;

/// A handle that can be used to request cancellation.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Request cancellation. Calls observing this handle stop as soon as
    /// they next poll it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Per-call context carrying cancellation and an optional deadline
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    cancel: CancelHandle,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context that is never cancelled and has no deadline
    pub fn background() -> Self {
        Self::default()
    }

    /// Context that expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().deadline(Instant::now() + timeout)
    }

    /// Set an absolute deadline
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Share an existing cancel handle with this context
    pub fn cancel_with(mut self, handle: CancelHandle) -> Self {
        self.cancel = handle;
        self
    }

    /// Handle that cancels this context (and every clone of it)
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Time left before the deadline; `None` when no deadline is set
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Fail fast if the context is cancelled or its deadline has passed
    pub fn check(&self) -> Result<(), RequestError> {
        if self.is_cancelled() {
            return Err(RequestError::Cancelled);
        }
        if self.remaining().is_some_and(|left| left.is_zero()) {
            return Err(RequestError::DeadlineExceeded);
        }
        Ok(())
    }
}
