//! Request-scoped context passed explicitly through every core call.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// Returned when a guarded future outlives the request deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("request deadline exceeded")]
pub struct DeadlineExceeded;

/// Correlation id and optional deadline of one inbound request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    deadline: Option<Instant>,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            deadline: None,
        }
    }

    /// A context with a fresh request id and no deadline.
    pub fn background() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, `None` when unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Run `fut` to completion or until the deadline passes.
    ///
    /// `fut` is never polled once the deadline has passed.
    pub async fn guard<F: Future>(&self, fut: F) -> Result<F::Output, DeadlineExceeded> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(DeadlineExceeded),
            Some(deadline) => tokio::time::timeout_at(deadline, fut)
                .await
                .map_err(|_| DeadlineExceeded),
            None => Ok(fut.await),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unbounded_context_runs_to_completion() {
        let ctx = RequestContext::background();
        assert!(ctx.deadline().is_none());
        assert_eq!(ctx.guard(async { 7 }).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn expired_deadline_stops_slow_future() {
        let ctx = RequestContext::new("req-1").with_timeout(Duration::from_millis(10));
        let result = ctx
            .guard(tokio::time::sleep(Duration::from_secs(5)))
            .await;
        assert_eq!(result, Err(DeadlineExceeded));
    }

    #[tokio::test]
    async fn elapsed_deadline_never_polls_the_future() {
        let ctx = RequestContext::new("req-3").with_timeout(Duration::ZERO);
        let mut polled = false;
        let result = ctx
            .guard(async {
                polled = true;
            })
            .await;
        assert_eq!(result, Err(DeadlineExceeded));
        assert!(!polled);
    }

    #[tokio::test]
    async fn fast_future_beats_deadline() {
        let ctx = RequestContext::new("req-2").with_timeout(Duration::from_secs(5));
        assert_eq!(ctx.guard(async { "ok" }).await.unwrap(), "ok");
        assert!(ctx.remaining().unwrap() <= Duration::from_secs(5));
    }

    #[test]
    fn background_contexts_get_distinct_ids() {
        let a = RequestContext::background();
        let b = RequestContext::background();
        assert_ne!(a.request_id(), b.request_id());
    }
}
