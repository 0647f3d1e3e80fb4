//! Route definitions for the `/channels` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::channel_auth;
use crate::state::AppState;

/// Routes mounted at `/channels`.
///
/// ```text
/// POST /authorize -> authorize (issue HMAC channel token)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/authorize", post(channel_auth::authorize))
}
