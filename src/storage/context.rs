//! Request-scoped cancellation and deadline carried into every table operation.

use crate::errors::StorageError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Caller context for a store operation.
///
/// Clones share the same cancellation token, so canceling any clone aborts
/// operations running under all of them.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    cancellation: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context that is never canceled and has no deadline
    pub fn background() -> Self {
        Self::default()
    }

    /// Context bound to an existing cancellation token, e.g. a server shutdown token
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            cancellation: token,
            deadline: None,
        }
    }

    /// Returns a context whose deadline is `timeout` from now, or the current deadline if earlier.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        });
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Fails when the context is already canceled or past its deadline.
    pub fn check(&self) -> Result<(), StorageError> {
        if self.cancellation.is_cancelled() {
            return Err(StorageError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(StorageError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Drives `operation` until it completes, the context is canceled, or the deadline elapses.
    ///
    /// The operation future is dropped on early abort.
    pub async fn run<F, T>(&self, operation: F) -> Result<T, StorageError>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        self.check()?;

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(StorageError::Canceled),
            _ = deadline => Err(StorageError::DeadlineExceeded),
            result = operation => result,
        }
    }
}
