//! Cancellation for running statements.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::{Result, SqlError};

/// Cancellation signal plus an optional deadline.
///
/// Clones share the signal: cancelling any clone cancels them all. A
/// derived context ([`with_timeout`](Self::with_timeout)) keeps the earlier
/// of the two deadlines.
#[derive(Debug, Clone)]
pub struct Context {
    cancel: Arc<watch::Sender<bool>>,
    deadline: Option<Instant>,
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl Context {
    /// A context that is never cancelled unless asked to.
    #[must_use]
    pub fn background() -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            cancel: Arc::new(cancel),
            deadline: None,
        }
    }

    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancels this context and every clone of it.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// Whether the context was cancelled or its deadline has passed.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow() || self.deadline.is_some_and(|at| Instant::now() >= at)
    }

    /// Completes once the context is cancelled or its deadline passes.
    pub async fn done(&self) {
        let mut signal = self.cancel.subscribe();
        let cancelled = async move {
            // The sender lives as long as `self`, so this only returns once
            // the flag flips.
            let _ = signal.wait_for(|cancelled| *cancelled).await;
        };
        match self.deadline {
            Some(at) => {
                tokio::select! {
                    () = cancelled => {}
                    () = tokio::time::sleep_until(at) => {}
                }
            }
            None => cancelled.await,
        }
    }

    /// Runs `fut` unless the context ends first, in which case `fut` is
    /// dropped and [`SqlError::Cancelled`] returned.
    ///
    /// # Errors
    ///
    /// Returns the error of `fut`, or `Cancelled`.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_cancelled() {
            return Err(SqlError::Cancelled);
        }
        tokio::select! {
            biased;
            () = self.done() => Err(SqlError::Cancelled),
            result = fut => result,
        }
    }
}
