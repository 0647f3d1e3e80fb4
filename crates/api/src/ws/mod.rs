//! WebSocket infrastructure for real-time fan-out.
//!
//! Provides connection and subscription management, keepalive pings, and
//! the authenticated HTTP upgrade handler used by Axum routes.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::start_ping_task;
pub use manager::WsManager;
