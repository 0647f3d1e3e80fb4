//! The heartbeat tracker state machine.
//!
//! ```text
//! uninitialized --start()--> tracking --stop()--> stopped
//!                              |  ^                  |
//!                              |  '----- start() ----'
//!                              |
//!                   foreground <-> background (visibility sub-state)
//! ```
//!
//! While tracking in the foreground, a periodic tick emits an `online`
//! heartbeat; in the background the tick is a no-op (the one-shot `away`
//! emitted on hiding stands until visibility returns). Page teardown sends
//! a single best-effort `offline` beacon.

use std::time::Duration;

use confab_core::presence::{PresenceStatus, HEARTBEAT_INTERVAL_SECS};
use confab_core::types::DbId;

use crate::transport::{BeaconOutcome, Heartbeat, HeartbeatTransport};

/// Top-level lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Uninitialized,
    Tracking,
    Stopped,
}

/// Visibility sub-state, meaningful only while tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Foreground,
    Background,
}

/// Client-side presence reporter.
pub struct HeartbeatTracker<T: HeartbeatTransport> {
    transport: T,
    state: TrackerState,
    visibility: Visibility,
    current_meeting_id: Option<DbId>,
}

impl<T: HeartbeatTransport> HeartbeatTracker<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: TrackerState::Uninitialized,
            visibility: Visibility::Foreground,
            current_meeting_id: None,
        }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Begin tracking: emit an immediate `online` heartbeat.
    ///
    /// Idempotent: calling while already tracking does nothing, so a
    /// re-authentication cannot double-arm the periodic timer.
    pub async fn start(&mut self) {
        if self.state == TrackerState::Tracking {
            return;
        }
        self.state = TrackerState::Tracking;
        self.visibility = Visibility::Foreground;
        self.emit(PresenceStatus::Online).await;
    }

    /// Periodic timer tick. Emits `online` only while tracking in the
    /// foreground; a no-op otherwise.
    pub async fn tick(&mut self) {
        if self.state == TrackerState::Tracking && self.visibility == Visibility::Foreground {
            self.emit(PresenceStatus::Online).await;
        }
    }

    /// The tab went hidden: report `away` once and mute the periodic tick.
    pub async fn on_hidden(&mut self) {
        if self.state != TrackerState::Tracking {
            return;
        }
        self.visibility = Visibility::Background;
        self.emit(PresenceStatus::Away).await;
    }

    /// The tab became visible again: report `online` and resume ticking.
    pub async fn on_visible(&mut self) {
        if self.state != TrackerState::Tracking {
            return;
        }
        self.visibility = Visibility::Foreground;
        self.emit(PresenceStatus::Online).await;
    }

    /// Page teardown (`pagehide`). When the page is not being persisted,
    /// make exactly one best-effort `offline` delivery: the beacon
    /// primitive if available, otherwise a single ordinary send whose
    /// outcome is ignored. Never retried either way.
    pub async fn on_page_hide(&mut self, persisted: bool) {
        if self.state != TrackerState::Tracking || persisted {
            return;
        }
        let heartbeat = Heartbeat::new(PresenceStatus::Offline, self.current_meeting_id);
        match self.transport.send_beacon(&heartbeat) {
            BeaconOutcome::Sent => {}
            BeaconOutcome::Failed => {
                tracing::debug!("Unload offline beacon reported failure");
            }
            BeaconOutcome::Unavailable => {
                if let Err(e) = self.transport.send(&heartbeat).await {
                    tracing::debug!(error = %e, "Unload offline heartbeat dropped");
                }
            }
        }
    }

    /// Stop tracking (logout). No further heartbeats are emitted until
    /// `start()` re-arms.
    pub async fn stop(&mut self) {
        self.state = TrackerState::Stopped;
    }

    /// Record which meeting the user is currently inside, attached to every
    /// subsequent heartbeat.
    pub fn set_current_meeting(&mut self, meeting_id: Option<DbId>) {
        self.current_meeting_id = meeting_id;
    }

    /// Deliver one heartbeat; failures are logged and dropped.
    async fn emit(&self, status: PresenceStatus) {
        let heartbeat = Heartbeat::new(status, self.current_meeting_id);
        if let Err(e) = self.transport.send(&heartbeat).await {
            tracing::debug!(error = %e, status = %status, "Heartbeat delivery failed");
        }
    }
}

/// Drive a tracker's periodic tick on the standard interval. Runs until
/// the future is dropped; intended to be raced against the application's
/// shutdown signal.
pub async fn run_ticker<T: HeartbeatTransport>(tracker: &mut HeartbeatTracker<T>) {
    let mut interval = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));
    // The first tick fires immediately; start() already emitted.
    interval.tick().await;
    loop {
        interval.tick().await;
        tracker.tick().await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::transport::{BeaconOutcome, TransportError};

    /// Records every delivery attempt; optionally fails them all.
    #[derive(Default)]
    struct MockTransport {
        sent: Mutex<Vec<Heartbeat>>,
        beacons: Mutex<Vec<Heartbeat>>,
        fail_sends: AtomicBool,
        beacon_available: AtomicBool,
        beacon_reports_failure: AtomicBool,
    }

    impl MockTransport {
        fn new() -> Self {
            let t = Self::default();
            t.beacon_available.store(true, Ordering::SeqCst);
            t
        }

        fn sent_statuses(&self) -> Vec<PresenceStatus> {
            self.sent.lock().unwrap().iter().map(|h| h.status).collect()
        }

        fn beacon_count(&self) -> usize {
            self.beacons.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl HeartbeatTransport for &MockTransport {
        async fn send(&self, heartbeat: &Heartbeat) -> Result<(), TransportError> {
            self.sent.lock().unwrap().push(heartbeat.clone());
            if self.fail_sends.load(Ordering::SeqCst) {
                Err(TransportError::Request("injected failure".into()))
            } else {
                Ok(())
            }
        }

        fn send_beacon(&self, heartbeat: &Heartbeat) -> BeaconOutcome {
            if !self.beacon_available.load(Ordering::SeqCst) {
                return BeaconOutcome::Unavailable;
            }
            self.beacons.lock().unwrap().push(heartbeat.clone());
            if self.beacon_reports_failure.load(Ordering::SeqCst) {
                BeaconOutcome::Failed
            } else {
                BeaconOutcome::Sent
            }
        }
    }

    #[tokio::test]
    async fn start_emits_initial_online() {
        let transport = MockTransport::new();
        let mut tracker = HeartbeatTracker::new(&transport);

        tracker.start().await;

        assert_eq!(tracker.state(), TrackerState::Tracking);
        assert_eq!(transport.sent_statuses(), vec![PresenceStatus::Online]);
    }

    #[tokio::test]
    async fn start_is_idempotent_while_tracking() {
        let transport = MockTransport::new();
        let mut tracker = HeartbeatTracker::new(&transport);

        tracker.start().await;
        tracker.start().await;

        // No second online emitted: double-start must not double-arm.
        assert_eq!(transport.sent_statuses(), vec![PresenceStatus::Online]);
    }

    #[tokio::test]
    async fn hidden_then_visible_emits_online_away_online() {
        let transport = MockTransport::new();
        let mut tracker = HeartbeatTracker::new(&transport);

        tracker.start().await;
        tracker.on_hidden().await;
        // Timer fires while hidden: must not emit a duplicate online.
        tracker.tick().await;
        tracker.tick().await;
        tracker.on_visible().await;

        assert_eq!(
            transport.sent_statuses(),
            vec![
                PresenceStatus::Online,
                PresenceStatus::Away,
                PresenceStatus::Online
            ]
        );
    }

    #[tokio::test]
    async fn tick_emits_online_only_in_foreground() {
        let transport = MockTransport::new();
        let mut tracker = HeartbeatTracker::new(&transport);

        tracker.tick().await; // uninitialized: no-op
        tracker.start().await;
        tracker.tick().await; // foreground: emits
        tracker.stop().await;
        tracker.tick().await; // stopped: no-op

        assert_eq!(
            transport.sent_statuses(),
            vec![PresenceStatus::Online, PresenceStatus::Online]
        );
    }

    #[tokio::test]
    async fn page_hide_makes_exactly_one_beacon_attempt() {
        let transport = MockTransport::new();
        let mut tracker = HeartbeatTracker::new(&transport);

        tracker.start().await;
        tracker.on_page_hide(false).await;

        assert_eq!(transport.beacon_count(), 1);
        // No fallback send happened: only the initial online was sent.
        assert_eq!(transport.sent_statuses(), vec![PresenceStatus::Online]);
    }

    #[tokio::test]
    async fn page_hide_with_persisted_page_is_a_noop() {
        let transport = MockTransport::new();
        let mut tracker = HeartbeatTracker::new(&transport);

        tracker.start().await;
        tracker.on_page_hide(true).await;

        assert_eq!(transport.beacon_count(), 0);
        assert_eq!(transport.sent_statuses(), vec![PresenceStatus::Online]);
    }

    #[tokio::test]
    async fn page_hide_falls_back_to_single_send_when_beacon_unavailable() {
        let transport = MockTransport::new();
        transport.beacon_available.store(false, Ordering::SeqCst);
        transport.fail_sends.store(true, Ordering::SeqCst);
        let mut tracker = HeartbeatTracker::new(&transport);

        tracker.start().await;
        tracker.on_page_hide(false).await;

        // One online (failed, dropped) + one offline fallback (failed,
        // dropped). No retries despite both failing.
        assert_eq!(
            transport.sent_statuses(),
            vec![PresenceStatus::Online, PresenceStatus::Offline]
        );
        assert_eq!(transport.beacon_count(), 0);
    }

    #[tokio::test]
    async fn beacon_reported_failure_is_not_retried() {
        let transport = MockTransport::new();
        transport.beacon_reports_failure.store(true, Ordering::SeqCst);
        let mut tracker = HeartbeatTracker::new(&transport);

        tracker.start().await;
        tracker.on_page_hide(false).await;

        assert_eq!(transport.beacon_count(), 1);
        // The reported failure must not trigger a fallback send.
        assert_eq!(transport.sent_statuses(), vec![PresenceStatus::Online]);
    }

    #[tokio::test]
    async fn failed_delivery_is_dropped_not_retried() {
        let transport = MockTransport::new();
        transport.fail_sends.store(true, Ordering::SeqCst);
        let mut tracker = HeartbeatTracker::new(&transport);

        tracker.start().await;
        tracker.tick().await;

        // Exactly one attempt per trigger, despite every send failing.
        assert_eq!(transport.sent_statuses().len(), 2);
    }

    #[tokio::test]
    async fn restart_after_stop_rearms() {
        let transport = MockTransport::new();
        let mut tracker = HeartbeatTracker::new(&transport);

        tracker.start().await;
        tracker.stop().await;
        tracker.start().await;

        assert_eq!(tracker.state(), TrackerState::Tracking);
        assert_eq!(
            transport.sent_statuses(),
            vec![PresenceStatus::Online, PresenceStatus::Online]
        );
    }

    #[tokio::test]
    async fn current_meeting_is_attached_to_heartbeats() {
        let transport = MockTransport::new();
        let mut tracker = HeartbeatTracker::new(&transport);

        tracker.set_current_meeting(Some(42));
        tracker.start().await;

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent[0].current_meeting_id, Some(42));
    }
}
