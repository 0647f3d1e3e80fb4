//! Handler for `POST /channels/authorize`.
//!
//! Authorization rules per channel class:
//! - `user:<id>` requires the embedded id to match the authenticated user.
//! - `meeting:<id>` and `presence:meeting:<id>` require meeting
//!   participation (host or invitee).
//! - `note:<id>` requires note collaboration (owner or collaborator).
//!
//! On success the handler issues an HMAC token binding the channel to the
//! user; the WebSocket subscribe path verifies it without another
//! database round-trip.

use axum::extract::State;
use axum::Json;
use confab_core::channels::Channel;
use confab_core::error::CoreError;
use confab_db::repositories::{MeetingRepo, NoteRepo};
use serde::{Deserialize, Serialize};

use crate::auth::channel_token::sign_channel;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /channels/authorize`.
#[derive(Debug, Deserialize)]
pub struct AuthorizeChannel {
    pub channel: String,
}

/// Issued channel authorization token.
#[derive(Debug, Serialize)]
pub struct ChannelToken {
    pub channel: Channel,
    pub token: String,
}

/// POST /api/v1/channels/authorize
pub async fn authorize(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<AuthorizeChannel>,
) -> AppResult<Json<DataResponse<ChannelToken>>> {
    let channel = Channel::parse(&input.channel)?;

    let allowed = match channel {
        Channel::User(id) => id == auth_user.user_id,
        Channel::Meeting(id) | Channel::MeetingPresence(id) => {
            MeetingRepo::is_participant(&state.pool, id, auth_user.user_id).await?
        }
        Channel::Note(id) => NoteRepo::is_collaborator(&state.pool, id, auth_user.user_id).await?,
    };

    if !allowed {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Not authorized for channel {channel}"
        ))));
    }

    let token = sign_channel(&channel, auth_user.user_id, &state.config.jwt.secret)?;
    Ok(Json(DataResponse {
        data: ChannelToken { channel, token },
    }))
}
