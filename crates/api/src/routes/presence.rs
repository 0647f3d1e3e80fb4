//! Route definitions for the `/presence` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::presence;
use crate::state::AppState;

/// Routes mounted at `/presence`.
///
/// ```text
/// POST /heartbeat -> heartbeat (bearer auth)
/// POST /beacon    -> beacon (cookie auth, unload path)
/// GET  /me        -> get_me
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/heartbeat", post(presence::heartbeat))
        .route("/beacon", post(presence::beacon))
        .route("/me", get(presence::get_me))
}
