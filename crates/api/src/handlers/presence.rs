//! Handlers for the `/presence` and `/friends/presence` endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use confab_core::presence::PresenceStatus;
use confab_db::models::presence::{FriendPresence, HeartbeatRequest, PresenceRecord};
use confab_db::repositories::PresenceRepo;

use crate::error::AppResult;
use crate::middleware::auth::{AuthUser, CookieUser};
use crate::presence::PresenceService;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/presence/heartbeat
///
/// Record a heartbeat for the authenticated user. Unknown status strings
/// are rejected with 400 before the store is touched.
pub async fn heartbeat(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<HeartbeatRequest>,
) -> AppResult<Json<DataResponse<PresenceRecord>>> {
    let status = PresenceStatus::parse(&input.status)?;
    let record = PresenceRepo::upsert(
        &state.pool,
        auth_user.user_id,
        status,
        input.current_meeting_id,
    )
    .await?;
    Ok(Json(DataResponse { data: record }))
}

/// POST /api/v1/presence/beacon
///
/// Unload-path heartbeat, authenticated from the session cookie because
/// the beacon primitive cannot set headers. Always answers 204: the page
/// is gone, nobody reads an error body. Failures are logged and dropped.
pub async fn beacon(
    State(state): State<AppState>,
    cookie_user: CookieUser,
    Json(input): Json<HeartbeatRequest>,
) -> StatusCode {
    match PresenceStatus::parse(&input.status) {
        Ok(status) => {
            if let Err(e) = PresenceRepo::upsert(
                &state.pool,
                cookie_user.user_id,
                status,
                input.current_meeting_id,
            )
            .await
            {
                tracing::warn!(error = %e, user_id = cookie_user.user_id, "Beacon upsert failed");
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, "Beacon with unknown status dropped");
        }
    }
    StatusCode::NO_CONTENT
}

/// GET /api/v1/presence/me
///
/// The caller's own presence record, provisioned as `online` on first read.
pub async fn get_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<PresenceRecord>>> {
    let record = PresenceService::get_own(&state.pool, auth_user.user_id).await?;
    Ok(Json(DataResponse { data: record }))
}

/// GET /api/v1/friends/presence
///
/// The caller's accepted friends with profile and staleness-adjusted
/// presence.
pub async fn friends_presence(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<FriendPresence>>>> {
    let friends = PresenceService::friends_with_presence(
        &state.pool,
        auth_user.user_id,
        state.config.presence.staleness_window_secs,
    )
    .await?;
    Ok(Json(DataResponse { data: friends }))
}
