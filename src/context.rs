//! Cancellation and deadline propagation for extraction work.
//!
//! A [`Context`] travels with every extraction call. It carries a
//! cancellation token (cancelling a parent cancels every derived child) and an
//! optional deadline. Blocking I/O inside strategies is wrapped in
//! [`Context::run`] so that work is abandoned as soon as either fires.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a context stopped accepting work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Interrupted {
    /// The context (or one of its ancestors) was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// The context's deadline passed.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl Interrupted {
    /// Returns true if this interruption came from a deadline.
    #[must_use]
    pub const fn is_timeout(self) -> bool {
        matches!(self, Self::DeadlineExceeded)
    }
}

/// Cancellation token plus optional deadline.
///
/// Cloning a context shares the same token; use [`Context::with_timeout`] or
/// [`Context::child`] to derive a context that can be cancelled on its own.
#[derive(Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cancelled", &self.token.is_cancelled())
            .field("deadline", &self.deadline)
            .finish()
    }
}

impl Context {
    /// Creates a root context with no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a root context that expires at `deadline`.
    #[must_use]
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// Creates a root context that expires after `timeout`.
    #[must_use]
    pub fn with_timeout_from_now(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Derives a child context that inherits cancellation and the deadline.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Derives a child context bounded by `timeout` or the parent's deadline,
    /// whichever is sooner.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(existing) if existing < candidate => existing,
            _ => candidate,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Cancels this context and every context derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the time left before the deadline, if any.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Returns true if the context was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Checks whether work may continue.
    ///
    /// # Errors
    ///
    /// Returns [`Interrupted`] if the context is cancelled or past its deadline.
    pub fn check(&self) -> Result<(), Interrupted> {
        if self.token.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(Interrupted::DeadlineExceeded);
        }
        Ok(())
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> Interrupted {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    () = self.token.cancelled() => Interrupted::Cancelled,
                    () = tokio::time::sleep_until(deadline) => Interrupted::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                Interrupted::Cancelled
            }
        }
    }

    /// Runs `fut` until it completes or the context is done.
    ///
    /// The future is dropped when the context fires, which aborts in-flight
    /// requests and kills child processes spawned with `kill_on_drop`.
    ///
    /// # Errors
    ///
    /// Returns [`Interrupted`] if the context fires before `fut` completes.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, Interrupted>
    where
        F: Future<Output = T>,
    {
        self.check()?;
        tokio::select! {
            biased;
            reason = self.done() => Err(reason),
            value = fut => Ok(value),
        }
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
