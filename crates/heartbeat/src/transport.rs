//! Heartbeat delivery transports.
//!
//! [`HeartbeatTransport`] is the seam between the tracker state machine
//! and the network. The production implementation speaks the backend's
//! heartbeat endpoint over HTTP with a short timeout; the beacon path is a
//! detached fire-and-forget request that survives the caller moving on.

use std::time::Duration;

use async_trait::async_trait;
use confab_core::presence::PresenceStatus;
use confab_core::types::DbId;
use serde::Serialize;

/// A single status report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heartbeat {
    pub status: PresenceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_meeting_id: Option<DbId>,
}

impl Heartbeat {
    pub fn new(status: PresenceStatus, current_meeting_id: Option<DbId>) -> Self {
        Self {
            status,
            current_meeting_id,
        }
    }
}

/// Error from a single delivery attempt. The tracker logs and drops these.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("heartbeat request failed: {0}")]
    Request(String),

    #[error("heartbeat request timed out")]
    Timeout,
}

/// Result of handing a heartbeat to the fire-and-forget beacon primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeaconOutcome {
    /// The payload was handed off; delivery happens (or not) out of band.
    Sent,
    /// The primitive accepted the call but reported failure. Still counts
    /// as the one attempt -- never retried.
    Failed,
    /// The primitive is not usable here; the tracker falls back to a
    /// single ordinary send.
    Unavailable,
}

/// Delivery capability injected into the tracker.
#[async_trait]
pub trait HeartbeatTransport: Send + Sync {
    /// Deliver a heartbeat, waiting (briefly) for the outcome.
    async fn send(&self, heartbeat: &Heartbeat) -> Result<(), TransportError>;

    /// Deliver a heartbeat without waiting for any response -- the page-
    /// teardown path.
    fn send_beacon(&self, heartbeat: &Heartbeat) -> BeaconOutcome;
}

/// Per-request timeout for ordinary heartbeat delivery. Short on purpose:
/// a heartbeat that cannot be delivered promptly is discarded, not queued.
const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP transport speaking the backend heartbeat endpoints.
pub struct HttpTransport {
    client: reqwest::Client,
    /// Authenticated heartbeat endpoint (bearer token).
    heartbeat_url: String,
    /// Unauthenticated beacon endpoint (cookie-derived identity).
    beacon_url: String,
    access_token: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, access_token: impl Into<String>) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            client: reqwest::Client::new(),
            heartbeat_url: format!("{base}/api/v1/presence/heartbeat"),
            beacon_url: format!("{base}/api/v1/presence/beacon"),
            access_token: access_token.into(),
        }
    }
}

#[async_trait]
impl HeartbeatTransport for HttpTransport {
    async fn send(&self, heartbeat: &Heartbeat) -> Result<(), TransportError> {
        let response = self
            .client
            .post(&self.heartbeat_url)
            .bearer_auth(&self.access_token)
            .json(heartbeat)
            .timeout(SEND_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Request(e.to_string())
                }
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(TransportError::Request(format!(
                "server responded {}",
                response.status()
            )))
        }
    }

    fn send_beacon(&self, heartbeat: &Heartbeat) -> BeaconOutcome {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return BeaconOutcome::Unavailable;
        };

        let request = self
            .client
            .post(&self.beacon_url)
            .header(
                reqwest::header::COOKIE,
                format!("access_token={}", self.access_token),
            )
            .json(heartbeat)
            .timeout(SEND_TIMEOUT);

        // Detach: the outcome is irrelevant to the caller and the endpoint
        // always responds success-shaped anyway.
        handle.spawn(async move {
            if let Err(e) = request.send().await {
                tracing::debug!(error = %e, "Beacon heartbeat dropped");
            }
        });
        BeaconOutcome::Sent
    }
}
