use std::sync::Mutex;

use async_trait::async_trait;

use sso_core::RequestContext;

use super::{NotificationError, Publisher, UserEvent};

#[derive(Debug, Clone)]
pub struct PublishedEvent {
    pub subject: String,
    pub payload: Vec<u8>,
}

impl PublishedEvent {
    pub fn event(&self) -> Result<UserEvent, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

/// Keeps published events in memory, or rejects every publish when built
/// with [`MemoryPublisher::failing`].
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    events: Mutex<Vec<PublishedEvent>>,
    fail: bool,
}

impl MemoryPublisher {
    pub fn failing() -> Self {
        Self {
            events: Mutex::default(),
            fail: true,
        }
    }

    pub fn events(&self) -> Vec<PublishedEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// The most recent event published under `subject`.
    pub fn last_event(&self, subject: &str) -> Option<UserEvent> {
        self.events()
            .into_iter()
            .rev()
            .find(|e| e.subject == subject)
            .and_then(|e| e.event().ok())
    }
}

#[async_trait]
impl Publisher for MemoryPublisher {
    async fn publish(
        &self,
        _ctx: &RequestContext,
        subject: &str,
        payload: &[u8],
    ) -> Result<(), NotificationError> {
        if self.fail {
            return Err(NotificationError::Unavailable("publisher rejected event".into()));
        }
        let mut events = self
            .events
            .lock()
            .map_err(|_| NotificationError::Unavailable("event store poisoned".into()))?;
        events.push(PublishedEvent {
            subject: subject.to_string(),
            payload: payload.to_vec(),
        });
        Ok(())
    }
}
