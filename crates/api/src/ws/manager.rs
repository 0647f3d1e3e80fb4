use std::collections::{HashMap, HashSet};

use axum::body::Bytes;
use axum::extract::ws::Message;
use confab_core::channels::Channel;
use confab_core::types::{DbId, Timestamp};
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// Authenticated user ID. Connections are authenticated at upgrade
    /// time; unauthenticated sockets are never registered.
    pub user_id: DbId,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// Wire names of the channels this connection is subscribed to.
    pub channels: HashSet<String>,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

/// Manages all active WebSocket connections and their channel subscriptions.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    /// Create a new, empty connection manager.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new authenticated connection.
    ///
    /// The connection is implicitly subscribed to its own private user
    /// channel. Returns the receiver half of the message channel so the
    /// caller can forward messages to the WebSocket sink.
    pub async fn add(&self, conn_id: String, user_id: DbId) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut channels = HashSet::new();
        channels.insert(Channel::User(user_id).name());
        let conn = WsConnection {
            user_id,
            sender: tx,
            channels,
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection by its ID, returning the channel names it was
    /// subscribed to so the caller can emit member-removed notices.
    pub async fn remove(&self, conn_id: &str) -> Vec<String> {
        match self.connections.write().await.remove(conn_id) {
            Some(conn) => conn.channels.into_iter().collect(),
            None => vec![],
        }
    }

    /// Subscribe a connection to a channel. Returns `false` if the
    /// connection is unknown or was already subscribed.
    pub async fn subscribe(&self, conn_id: &str, channel: &Channel) -> bool {
        let mut conns = self.connections.write().await;
        match conns.get_mut(conn_id) {
            Some(conn) => conn.channels.insert(channel.name()),
            None => false,
        }
    }

    /// Unsubscribe a connection from a channel. Returns `false` if the
    /// connection is unknown or was not subscribed.
    pub async fn unsubscribe(&self, conn_id: &str, channel: &Channel) -> bool {
        let mut conns = self.connections.write().await;
        match conns.get_mut(conn_id) {
            Some(conn) => conn.channels.remove(&channel.name()),
            None => false,
        }
    }

    /// Send a message to every connection subscribed to a channel,
    /// optionally excluding all of one user's connections.
    ///
    /// Connections whose send channels are closed are silently skipped
    /// (they will be cleaned up on their next receive loop iteration).
    /// Returns the number of connections the message was sent to; zero
    /// subscribers is a normal pub/sub outcome, not an error.
    pub async fn send_to_channel(
        &self,
        channel: &Channel,
        message: Message,
        exclude_user: Option<DbId>,
    ) -> usize {
        let name = channel.name();
        let conns = self.connections.read().await;
        let mut count = 0;
        for conn in conns.values() {
            if exclude_user == Some(conn.user_id) {
                continue;
            }
            if conn.channels.contains(&name) {
                let _ = conn.sender.send(message.clone());
                count += 1;
            }
        }
        count
    }

    /// Send a message to all connections belonging to a specific user.
    ///
    /// Returns the number of connections the message was sent to.
    pub async fn send_to_user(&self, user_id: DbId, message: Message) -> usize {
        let conns = self.connections.read().await;
        let mut count = 0;
        for conn in conns.values() {
            if conn.user_id == user_id {
                let _ = conn.sender.send(message.clone());
                count += 1;
            }
        }
        count
    }

    /// Distinct user ids currently subscribed to a channel, for presence
    /// channel member lists.
    pub async fn channel_member_ids(&self, channel: &Channel) -> Vec<DbId> {
        let name = channel.name();
        let conns = self.connections.read().await;
        let mut members: Vec<DbId> = conns
            .values()
            .filter(|conn| conn.channels.contains(&name))
            .map(|conn| conn.user_id)
            .collect();
        members.sort_unstable();
        members.dedup();
        members
    }

    /// Whether a user still has at least one connection subscribed to a
    /// channel. Used to decide if a disconnect ends the user's membership.
    pub async fn user_subscribed(&self, user_id: DbId, channel: &Channel) -> bool {
        let name = channel.name();
        let conns = self.connections.read().await;
        conns
            .values()
            .any(|conn| conn.user_id == user_id && conn.channels.contains(&name))
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops accepting new connections.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    ///
    /// Used by the ping task to keep connections alive and detect stale
    /// ones.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
