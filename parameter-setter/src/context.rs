use std::fmt;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a call stopped waiting for the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interruption {
    Cancelled,
    DeadlineExceeded,
}

impl fmt::Display for Interruption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "operation cancelled"),
            Self::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

impl std::error::Error for Interruption {}

/// Per-call cancellation and deadline.
///
/// Child contexts share the parent's token, so cancelling the parent
/// interrupts every call made with a child.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel_token: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context that is never interrupted unless its token is cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_cancel_token(cancel_token: CancellationToken) -> Self {
        Self {
            cancel_token,
            deadline: None,
        }
    }

    /// Child context whose deadline is the earlier of the current one and
    /// `deadline`.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        };
        Self {
            cancel_token: self.cancel_token.child_token(),
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel_token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Reports an interruption that already happened, without waiting.
    pub fn interruption(&self) -> Option<Interruption> {
        if self.cancel_token.is_cancelled() {
            return Some(Interruption::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Interruption::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> Interruption {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;

                () = self.cancel_token.cancelled() => Interruption::Cancelled,
                () = tokio::time::sleep_until(deadline) => Interruption::DeadlineExceeded,
            },
            None => {
                self.cancel_token.cancelled().await;
                Interruption::Cancelled
            }
        }
    }
}
