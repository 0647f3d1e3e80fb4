//! Client-side presence heartbeat tracker.
//!
//! Reports a user's advisory status to the backend on a fixed interval and
//! on lifecycle transitions (tab hidden/visible, page teardown, logout).
//! The tracker is an explicit state machine with the transport injected as
//! a capability, so tests drive transitions and ticks directly without
//! real timers or sockets.
//!
//! Presence is advisory: a failed delivery is logged and dropped -- never
//! retried, never surfaced.

pub mod tracker;
pub mod transport;

pub use tracker::{HeartbeatTracker, TrackerState, Visibility};
pub use transport::{BeaconOutcome, Heartbeat, HeartbeatTransport, HttpTransport, TransportError};
