//! WebSocket-backed implementation of the [`Notifier`] publish seam.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::Message;
use confab_core::types::DbId;
use confab_events::{NotificationEvent, Notifier, NotifyError};

use crate::ws::WsManager;

/// Publishes notification events to live WebSocket channel subscribers.
///
/// Serializes the event envelope to JSON once and delivers it to every
/// connection subscribed to the event's channel. Zero subscribers is a
/// normal outcome; there is no queuing for absent recipients.
pub struct WsNotifier {
    ws_manager: Arc<WsManager>,
}

impl WsNotifier {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }
}

#[async_trait]
impl Notifier for WsNotifier {
    async fn publish(
        &self,
        event: &NotificationEvent,
        exclude_user: Option<DbId>,
    ) -> Result<(), NotifyError> {
        let payload = serde_json::to_string(event)?;
        let delivered = self
            .ws_manager
            .send_to_channel(&event.channel, Message::Text(payload.into()), exclude_user)
            .await;
        tracing::debug!(channel = %event.channel, delivered, "Published notification");
        Ok(())
    }
}
