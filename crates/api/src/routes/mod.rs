//! API route tree.
//!
//! Resource routers are nested under `/api/v1`; the health check and the
//! WebSocket endpoint are mounted at the root level by
//! [`crate::router::build_app_router`].
//!
//! ```text
//! /api/v1
//!   /ws          -> WebSocket upgrade
//!   /auth        -> register, login, refresh, logout
//!   /presence    -> heartbeat, beacon, me
//!   /friends     -> requests, responses, friend list, friends presence
//!   /meetings    -> meetings, invitations, start, transcript
//!   /notes       -> notes, collaborators, action items
//!   /channels    -> channel token authorization
//! ```

pub mod auth;
pub mod channels;
pub mod friends;
pub mod health;
pub mod meetings;
pub mod notes;
pub mod presence;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// All versioned API routes, to be nested under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/auth", auth::router())
        .nest("/presence", presence::router())
        .nest("/friends", friends::router())
        .nest("/meetings", meetings::router())
        .nest("/notes", notes::router())
        .nest("/channels", channels::router())
}
