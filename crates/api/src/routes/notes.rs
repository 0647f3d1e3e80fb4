//! Route definitions for the `/notes` resource.
//!
//! All endpoints require authentication.

use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::handlers::note;
use crate::state::AppState;

/// Routes mounted at `/notes`.
///
/// ```text
/// POST   /                                -> create_note
/// GET    /{id}                            -> get_note (collaborators)
/// PATCH  /{id}                            -> update_note (collaborators)
/// POST   /{id}/collaborators              -> share (owner only)
/// DELETE /{id}/collaborators/{user_id}    -> unshare (owner or self)
/// GET    /{id}/action-items               -> list_action_items
/// POST   /{id}/action-items               -> create_action_item
/// PATCH  /action-items/{id}               -> update_action_item
/// DELETE /action-items/{id}               -> delete_action_item
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(note::create_note))
        .route("/{id}", get(note::get_note).patch(note::update_note))
        .route("/{id}/collaborators", post(note::share))
        .route("/{id}/collaborators/{user_id}", delete(note::unshare))
        .route(
            "/{id}/action-items",
            get(note::list_action_items).post(note::create_action_item),
        )
        .route("/action-items/{id}", patch(note::update_action_item))
        .route("/action-items/{id}", delete(note::delete_action_item))
}
