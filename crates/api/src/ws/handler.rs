//! WebSocket upgrade handler and per-connection frame loop.
//!
//! Connections authenticate at upgrade time with `?token=<jwt>` (browsers
//! cannot set headers on WebSocket requests). After the upgrade the
//! connection is implicitly subscribed to its own user channel; resource
//! and presence channels are joined with `subscribe` frames carrying the
//! HMAC token issued by `POST /channels/authorize`.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use confab_core::channels::Channel;
use confab_core::error::CoreError;
use confab_core::types::DbId;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;

use crate::auth::channel_token::verify_channel;
use crate::auth::jwt::validate_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::ws::manager::WsManager;

/// Query parameters for the WebSocket upgrade request.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: String,
}

/// Inbound channel-management frame.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
enum ClientFrame {
    Subscribe { channel: String, token: String },
    Unsubscribe { channel: String },
}

/// HTTP handler that authenticates and upgrades the connection to WebSocket.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let claims = validate_token(&query.token, &state.config.jwt)
        .map_err(|_| AppError::Core(CoreError::Unauthorized("Invalid or expired token".into())))?;

    let user_id = claims.sub;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user_id)))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager` (auto-subscribed to its
///      own user channel).
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Processes inbound subscribe/unsubscribe frames on the current task.
///   4. Cleans up on disconnect, emitting member-removed on presence
///      channels the user has fully left.
async fn handle_socket(socket: WebSocket, state: AppState, user_id: DbId) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, user_id, "WebSocket connected");

    let ws_manager = Arc::clone(&state.ws_manager);
    let mut rx = ws_manager.add(conn_id.clone(), user_id).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Receiver loop: process inbound messages.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Text(text)) => {
                handle_frame(&state, &conn_id, user_id, &text).await;
            }
            Ok(_msg) => {
                // Binary frames carry nothing in this protocol.
            }
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: remove the connection and abort the sender task, then emit
    // member-removed on any presence channel the user has fully left.
    let channels = ws_manager.remove(&conn_id).await;
    send_task.abort();
    for name in channels {
        if let Ok(channel) = Channel::parse(&name) {
            if channel.is_presence() {
                emit_member_removed_if_gone(&ws_manager, &channel, user_id).await;
            }
        }
    }
    tracing::info!(conn_id = %conn_id, user_id, "WebSocket disconnected");
}

/// Dispatch one inbound text frame.
async fn handle_frame(state: &AppState, conn_id: &str, user_id: DbId, text: &str) {
    let frame: ClientFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            send_error(&state.ws_manager, user_id, &format!("Malformed frame: {e}")).await;
            return;
        }
    };

    match frame {
        ClientFrame::Subscribe { channel, token } => {
            handle_subscribe(state, conn_id, user_id, &channel, &token).await;
        }
        ClientFrame::Unsubscribe { channel } => {
            handle_unsubscribe(state, conn_id, user_id, &channel).await;
        }
    }
}

async fn handle_subscribe(
    state: &AppState,
    conn_id: &str,
    user_id: DbId,
    channel_name: &str,
    token: &str,
) {
    let ws_manager = &state.ws_manager;

    let channel = match Channel::parse(channel_name) {
        Ok(channel) => channel,
        Err(e) => {
            send_error(ws_manager, user_id, &e.to_string()).await;
            return;
        }
    };

    if !verify_channel(token, &channel, user_id, &state.config.jwt.secret) {
        send_error(
            ws_manager,
            user_id,
            &format!("Not authorized for channel {channel}"),
        )
        .await;
        return;
    }

    // For presence channels, detect a genuinely new member (the user had no
    // other subscribed connection) before registering this one.
    let newly_joined =
        channel.is_presence() && !ws_manager.user_subscribed(user_id, &channel).await;

    ws_manager.subscribe(conn_id, &channel).await;

    let ack = json!({ "type": "subscribed", "channel": channel });
    ws_manager
        .send_to_user(user_id, Message::Text(ack.to_string().into()))
        .await;

    if channel.is_presence() {
        // Current member list to the subscriber, member-added to the room.
        let members = ws_manager.channel_member_ids(&channel).await;
        let roster = json!({
            "type": "presence-members",
            "channel": channel,
            "members": members,
        });
        ws_manager
            .send_to_user(user_id, Message::Text(roster.to_string().into()))
            .await;

        if newly_joined {
            let notice = json!({
                "type": "member-added",
                "channel": channel,
                "user_id": user_id,
            });
            ws_manager
                .send_to_channel(&channel, Message::Text(notice.to_string().into()), None)
                .await;
        }
    }
}

async fn handle_unsubscribe(state: &AppState, conn_id: &str, user_id: DbId, channel_name: &str) {
    let ws_manager = &state.ws_manager;

    let channel = match Channel::parse(channel_name) {
        Ok(channel) => channel,
        Err(e) => {
            send_error(ws_manager, user_id, &e.to_string()).await;
            return;
        }
    };

    ws_manager.unsubscribe(conn_id, &channel).await;

    let ack = json!({ "type": "unsubscribed", "channel": channel });
    ws_manager
        .send_to_user(user_id, Message::Text(ack.to_string().into()))
        .await;

    if channel.is_presence() {
        emit_member_removed_if_gone(ws_manager, &channel, user_id).await;
    }
}

/// Broadcast member-removed on a presence channel once the user has no
/// remaining subscribed connection.
async fn emit_member_removed_if_gone(ws_manager: &WsManager, channel: &Channel, user_id: DbId) {
    if ws_manager.user_subscribed(user_id, channel).await {
        return;
    }
    let notice = json!({
        "type": "member-removed",
        "channel": channel,
        "user_id": user_id,
    });
    ws_manager
        .send_to_channel(channel, Message::Text(notice.to_string().into()), None)
        .await;
}

/// Push an error frame to all of a user's connections.
async fn send_error(ws_manager: &WsManager, user_id: DbId, message: &str) {
    let frame = json!({ "type": "error", "error": message });
    ws_manager
        .send_to_user(user_id, Message::Text(frame.to_string().into()))
        .await;
}
