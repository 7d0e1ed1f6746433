//! Notification bridge.
//!
//! Emits verify-email and forget-password events through a [`Publisher`]
//! under configured subjects. Provides:
//! - [`WebhookPublisher`] that POSTs events to an HTTP endpoint
//! - [`LogPublisher`] that only records events in the log
//! - [`MemoryPublisher`] that keeps events in memory

mod log;
mod memory;
mod webhook;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use sso_core::RequestContext;
use sso_core::config::{NotificationsConfig, SubjectsConfig};

pub use self::log::LogPublisher;
pub use memory::{MemoryPublisher, PublishedEvent};
pub use webhook::WebhookPublisher;

/// Errors that can occur while publishing an event.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Payload encoding error: {0}")]
    Encode(String),

    /// HTTP client could not be built or the request failed.
    #[error("Request error: {0}")]
    Request(String),

    /// The endpoint answered with a non-success status code.
    #[error("Endpoint error (status {status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("Publisher unavailable: {0}")]
    Unavailable(String),

    #[error("Deadline exceeded")]
    DeadlineExceeded,
}

impl From<sso_core::DeadlineExceeded> for NotificationError {
    fn from(_: sso_core::DeadlineExceeded) -> Self {
        Self::DeadlineExceeded
    }
}

/// Sink for notification events.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(
        &self,
        ctx: &RequestContext,
        subject: &str,
        payload: &[u8],
    ) -> Result<(), NotificationError>;
}

/// JSON body of every event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEvent {
    pub user_id: u64,
    /// Opaque token the recipient redeems to finish the flow.
    pub token: String,
}

/// Builds the webhook publisher when an endpoint is configured, the log
/// publisher otherwise.
pub fn publisher_from_config(
    config: &NotificationsConfig,
) -> Result<Arc<dyn Publisher>, NotificationError> {
    match &config.endpoint {
        Some(endpoint) => Ok(Arc::new(WebhookPublisher::new(
            endpoint,
            std::time::Duration::from_secs(config.timeout_secs),
        )?)),
        None => Ok(Arc::new(LogPublisher)),
    }
}

/// Publishes identity events under their configured subjects.
#[derive(Clone)]
pub struct Notifier {
    publisher: Arc<dyn Publisher>,
    subjects: SubjectsConfig,
}

impl Notifier {
    pub fn new(publisher: Arc<dyn Publisher>, subjects: SubjectsConfig) -> Self {
        Self {
            publisher,
            subjects,
        }
    }

    pub async fn verify_email(
        &self,
        ctx: &RequestContext,
        user_id: u64,
        token: String,
    ) -> Result<(), NotificationError> {
        self.send(ctx, &self.subjects.verify_email, UserEvent { user_id, token })
            .await
    }

    pub async fn forget_password(
        &self,
        ctx: &RequestContext,
        user_id: u64,
        token: String,
    ) -> Result<(), NotificationError> {
        self.send(
            ctx,
            &self.subjects.forget_password,
            UserEvent { user_id, token },
        )
        .await
    }

    async fn send(
        &self,
        ctx: &RequestContext,
        subject: &str,
        event: UserEvent,
    ) -> Result<(), NotificationError> {
        let payload =
            serde_json::to_vec(&event).map_err(|e| NotificationError::Encode(e.to_string()))?;
        self.publisher.publish(ctx, subject, &payload).await
    }
}
