//! Request Context
//!
//! Carries the caller's cancellation signal and deadline into the service.
//! Every suspension point (store call, hashing) is raced against both.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{IdentityError, IdentityResult};

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// No deadline, never cancelled unless the token is triggered
    pub fn new() -> Self {
        Self::default()
    }

    /// Tie this context to an existing token (e.g. shutdown)
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail fast if already cancelled or past the deadline
    pub fn check(&self) -> IdentityResult<()> {
        if self.cancel.is_cancelled() {
            return Err(IdentityError::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| deadline <= Instant::now()) {
            return Err(IdentityError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Drive `fut` unless cancellation or the deadline comes first
    pub async fn run<F, T>(&self, fut: F) -> IdentityResult<T>
    where
        F: Future<Output = IdentityResult<T>>,
    {
        self.check()?;

        let guarded = async {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(IdentityError::Cancelled),
                out = fut => out,
            }
        };

        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, guarded)
                .await
                .unwrap_or(Err(IdentityError::DeadlineExceeded)),
            None => guarded.await,
        }
    }
}
