//! Presence status values and the read-time staleness policy.
//!
//! Presence is advisory: the store records the last status a client
//! reported plus when it reported it. Writes are last-write-wins per user
//! (the store's atomic upsert-by-user-id provides per-user consistency;
//! nothing is linearizable across machines, and that is acceptable because
//! presence is a hint, not a correctness signal).
//!
//! The reference behaviour left a gap: a client that dies without sending
//! its unload beacon stays "online" forever. We close it at read time --
//! any record whose `last_seen_at` is older than the staleness window is
//! reported as [`PresenceStatus::Offline`]. The stored row is not mutated.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Interval between periodic client heartbeats, in seconds.
pub const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Default staleness window: 2x the heartbeat interval. A record older
/// than this is reported offline at read time.
pub const DEFAULT_STALENESS_WINDOW_SECS: i64 = 2 * HEARTBEAT_INTERVAL_SECS as i64;

/// A user's advisory availability status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Away,
    Busy,
    Offline,
}

impl PresenceStatus {
    /// The canonical lowercase string stored in the `user_presence.status`
    /// column and accepted at the heartbeat endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            PresenceStatus::Online => "online",
            PresenceStatus::Away => "away",
            PresenceStatus::Busy => "busy",
            PresenceStatus::Offline => "offline",
        }
    }

    /// Parse a client-supplied status string.
    ///
    /// Anything other than the four recognized values is a validation
    /// error; the heartbeat endpoint rejects it before touching the store.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "online" => Ok(PresenceStatus::Online),
            "away" => Ok(PresenceStatus::Away),
            "busy" => Ok(PresenceStatus::Busy),
            "offline" => Ok(PresenceStatus::Offline),
            other => Err(CoreError::Validation(format!(
                "Unknown presence status '{other}'. Expected one of: online, away, busy, offline"
            ))),
        }
    }
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Apply the staleness window to a stored status.
///
/// Returns the status the caller should display: the stored one while the
/// record is fresh, [`PresenceStatus::Offline`] once `last_seen_at` falls
/// outside the window.
pub fn effective_status(
    stored: PresenceStatus,
    last_seen_at: Timestamp,
    now: Timestamp,
    staleness_window_secs: i64,
) -> PresenceStatus {
    if now - last_seen_at > Duration::seconds(staleness_window_secs) {
        PresenceStatus::Offline
    } else {
        stored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn parse_accepts_all_recognized_values() {
        for (s, expected) in [
            ("online", PresenceStatus::Online),
            ("away", PresenceStatus::Away),
            ("busy", PresenceStatus::Busy),
            ("offline", PresenceStatus::Offline),
        ] {
            assert_eq!(PresenceStatus::parse(s).unwrap(), expected);
        }
    }

    #[test]
    fn parse_rejects_unknown_values() {
        for s in ["Online", "ONLINE", "idle", "", "on-line"] {
            let err = PresenceStatus::parse(s).unwrap_err();
            assert!(
                matches!(err, CoreError::Validation(_)),
                "expected Validation error for {s:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn round_trips_through_as_str() {
        for status in [
            PresenceStatus::Online,
            PresenceStatus::Away,
            PresenceStatus::Busy,
            PresenceStatus::Offline,
        ] {
            assert_eq!(PresenceStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn fresh_record_keeps_stored_status() {
        let now = Utc::now();
        let seen = now - Duration::seconds(10);
        assert_eq!(
            effective_status(PresenceStatus::Busy, seen, now, DEFAULT_STALENESS_WINDOW_SECS),
            PresenceStatus::Busy
        );
    }

    #[test]
    fn stale_record_reads_as_offline() {
        let now = Utc::now();
        let seen = now - Duration::seconds(DEFAULT_STALENESS_WINDOW_SECS + 1);
        assert_eq!(
            effective_status(PresenceStatus::Online, seen, now, DEFAULT_STALENESS_WINDOW_SECS),
            PresenceStatus::Offline
        );
    }

    #[test]
    fn record_exactly_at_window_boundary_is_still_fresh() {
        let now = Utc::now();
        let seen = now - Duration::seconds(DEFAULT_STALENESS_WINDOW_SECS);
        assert_eq!(
            effective_status(PresenceStatus::Away, seen, now, DEFAULT_STALENESS_WINDOW_SECS),
            PresenceStatus::Away
        );
    }
}
