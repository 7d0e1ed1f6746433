use async_trait::async_trait;
use tracing::info;

use sso_core::RequestContext;

use super::{NotificationError, Publisher};

/// Records events in the log only. Used when no endpoint is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPublisher;

#[async_trait]
impl Publisher for LogPublisher {
    async fn publish(
        &self,
        ctx: &RequestContext,
        subject: &str,
        payload: &[u8],
    ) -> Result<(), NotificationError> {
        // Payloads carry redeemable tokens; only their size is logged.
        info!(
            request_id = ctx.request_id(),
            subject,
            bytes = payload.len(),
            "Notification published to log"
        );
        Ok(())
    }
}
