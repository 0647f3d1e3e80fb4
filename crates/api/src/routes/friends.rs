//! Route definitions for the `/friends` resource.
//!
//! All endpoints require authentication.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{friendship, presence};
use crate::state::AppState;

/// Routes mounted at `/friends`.
///
/// ```text
/// GET    /              -> list_friends
/// POST   /              -> send_request
/// GET    /requests      -> pending_requests
/// GET    /presence      -> friends_presence
/// POST   /{id}/respond  -> respond
/// DELETE /{id}          -> remove (cancel / unfriend)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(friendship::list_friends).post(friendship::send_request),
        )
        .route("/requests", get(friendship::pending_requests))
        .route("/presence", get(presence::friends_presence))
        .route("/{id}/respond", post(friendship::respond))
        .route("/{id}", delete(friendship::remove))
}
