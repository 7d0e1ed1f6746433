//! HTTP webhook publisher.
//!
//! POSTs each event's JSON payload to `{endpoint}/{subject}`.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use sso_core::RequestContext;

use super::{NotificationError, Publisher};

#[derive(Debug, Clone)]
pub struct WebhookPublisher {
    http: reqwest::Client,
    endpoint: String,
}

impl WebhookPublisher {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, NotificationError> {
        // The workspace builds reqwest without a crypto provider.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotificationError::Request(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// URL an event published under `subject` is posted to.
    pub fn url_for(&self, subject: &str) -> String {
        format!("{}/{subject}", self.endpoint)
    }
}

#[async_trait]
impl Publisher for WebhookPublisher {
    async fn publish(
        &self,
        ctx: &RequestContext,
        subject: &str,
        payload: &[u8],
    ) -> Result<(), NotificationError> {
        let request = self
            .http
            .post(self.url_for(subject))
            .header("content-type", "application/json")
            .header("x-request-id", ctx.request_id())
            .body(payload.to_vec())
            .send();

        let response = ctx
            .guard(request)
            .await?
            .map_err(|e| NotificationError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(request_id = ctx.request_id(), subject, "Notification delivered");
            Ok(())
        } else {
            let status_code = status.as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            warn!(
                request_id = ctx.request_id(),
                subject,
                status = status_code,
                "Notification endpoint returned error"
            );
            Err(NotificationError::ApiError {
                status: status_code,
                body,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_endpoint_and_subject() {
        let publisher =
            WebhookPublisher::new("http://hooks.local/events/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            publisher.url_for("sso.verify-email"),
            "http://hooks.local/events/sso.verify-email"
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails_publish() {
        // Port 9 (discard) on localhost is closed in test environments.
        let publisher =
            WebhookPublisher::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let result = publisher
            .publish(&RequestContext::background(), "s", b"{}")
            .await;
        assert!(result.is_err());
    }
}
