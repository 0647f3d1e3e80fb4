//! The publish primitive the notification router fans out through.
//!
//! The broker behind the trait is an external concern; the in-process
//! WebSocket implementation lives in the api crate and tests use doubles
//! to inject failures and record deliveries.

use async_trait::async_trait;
use confab_core::types::DbId;

use crate::event::NotificationEvent;

/// Error from a single publish attempt.
///
/// Publish failures are best-effort territory: callers log them and move
/// on -- never retried, never surfaced to the end user, never allowed to
/// abort sibling publishes or the triggering domain action.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("broker unavailable: {0}")]
    Unavailable(String),
}

/// Fire-and-forget channel publisher.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Publish `event` to every live subscriber of its target channel.
    ///
    /// `exclude_user` suppresses delivery to one subscriber -- used for
    /// resource-channel events so the actor does not get echoed their own
    /// change. Delivery to a channel with no subscribers is a no-op, not
    /// an error (pub/sub semantics: no queuing for absent recipients).
    async fn publish(
        &self,
        event: &NotificationEvent,
        exclude_user: Option<DbId>,
    ) -> Result<(), NotifyError>;
}
