// ABOUTME: Cancellation and deadline context for network-touching operations.
// ABOUTME: Wraps engine and registry futures so callers can abort them promptly.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a guarded call did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Interrupted {
    #[error("operation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Caller-owned cancellation token plus an optional deadline.
///
/// Cloning shares the token, so cancelling any clone cancels them all.
#[derive(Debug, Clone, Default)]
pub struct CheckContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl CheckContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    /// Add a deadline `timeout` from now. An earlier existing deadline wins.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drive `fut` until it finishes, the token is cancelled, or the deadline
    /// passes. An interrupted future is dropped, aborting its I/O.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, Interrupted>
    where
        F: Future<Output = T>,
    {
        if self.cancel.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }

        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Interrupted::Cancelled),
            _ = deadline => Err(Interrupted::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }
}
