//! Route definitions for the `/meetings` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::meeting;
use crate::state::AppState;

/// Routes mounted at `/meetings`.
///
/// ```text
/// POST /                          -> create_meeting
/// GET  /{id}                      -> get_meeting (participants)
/// POST /{id}/invitations          -> invite (host only)
/// POST /invitations/{id}/respond  -> respond_invitation (invitee only)
/// POST /{id}/start                -> start_meeting (host only, one-shot)
/// GET  /{id}/transcript           -> list_transcript (participants)
/// POST /{id}/transcript           -> append_transcript (participants)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(meeting::create_meeting))
        .route("/{id}", get(meeting::get_meeting))
        .route("/{id}/invitations", post(meeting::invite))
        .route(
            "/invitations/{id}/respond",
            post(meeting::respond_invitation),
        )
        .route("/{id}/start", post(meeting::start_meeting))
        .route(
            "/{id}/transcript",
            get(meeting::list_transcript).post(meeting::append_transcript),
        )
}
