use std::sync::Arc;
use std::time::Duration;

use crate::ws::manager::WsManager;

/// Interval between keepalive pings (in seconds).
const PING_INTERVAL_SECS: u64 = 30;

/// Spawn a background task that sends periodic Ping frames to all connected
/// WebSocket clients.
///
/// The task runs until aborted during shutdown. The returned `JoinHandle`
/// can be used to abort it explicitly.
pub fn start_ping_task(ws_manager: Arc<WsManager>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(PING_INTERVAL_SECS));

        loop {
            interval.tick().await;
            let count = ws_manager.connection_count().await;
            tracing::debug!(count, "WebSocket keepalive ping");
            ws_manager.ping_all().await;
        }
    })
}
