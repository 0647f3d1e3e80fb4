//! Handlers for the `/friends` resource.
//!
//! The unordered-pair invariant is checked here with a friendly message
//! and enforced by the `uq_friendships_pair` index underneath (surfacing
//! as 409 if two requests race past the pre-check).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use confab_core::error::CoreError;
use confab_core::friendship::FriendshipStatus;
use confab_core::types::DbId;
use confab_db::models::friendship::{CreateFriendRequest, Friendship, RespondRequest};
use confab_db::models::user::UserProfile;
use confab_db::repositories::{FriendshipRepo, UserRepo};
use confab_events::DomainEvent;

use crate::error::{AppError, AppResult};
use crate::handlers::actor_for;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/friends
///
/// Send a friend request. Exactly one relationship row may exist per
/// unordered user pair, so any existing row (pending, accepted, or
/// declined) rejects the request with 409.
pub async fn send_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<CreateFriendRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Friendship>>)> {
    if input.addressee_id == auth_user.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "Cannot send a friend request to yourself".into(),
        )));
    }

    let addressee = UserRepo::find_by_id(&state.pool, input.addressee_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "User",
                id: input.addressee_id,
            })
        })?;

    if let Some(existing) =
        FriendshipRepo::find_between(&state.pool, auth_user.user_id, input.addressee_id).await?
    {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "A relationship with this user already exists (status: {})",
            existing.status
        ))));
    }

    let friendship =
        FriendshipRepo::create(&state.pool, auth_user.user_id, input.addressee_id).await?;

    let requester = actor_for(&state.pool, auth_user.user_id).await?;
    state.event_bus.publish(DomainEvent::FriendRequestCreated {
        friendship_id: friendship.id,
        requester,
        addressee_id: addressee.id,
    });

    Ok((StatusCode::CREATED, Json(DataResponse { data: friendship })))
}

/// POST /api/v1/friends/{id}/respond
///
/// Accept or decline a pending friend request. Only the addressee may
/// respond; a request that is no longer pending conflicts.
pub async fn respond(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<RespondRequest>,
) -> AppResult<Json<DataResponse<Friendship>>> {
    let friendship = FriendshipRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Friend request",
                id,
            })
        })?;

    if friendship.addressee_id != auth_user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the addressee can respond to a friend request".into(),
        )));
    }

    let new_status = if input.accept {
        FriendshipStatus::Accepted
    } else {
        FriendshipStatus::Declined
    };

    let updated = FriendshipRepo::respond(&state.pool, id, new_status)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "This friend request has already been responded to".into(),
            ))
        })?;

    let responder = actor_for(&state.pool, auth_user.user_id).await?;
    state.event_bus.publish(DomainEvent::FriendRequestResponded {
        friendship_id: updated.id,
        requester_id: updated.requester_id,
        responder,
        accepted: input.accept,
    });

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/friends/{id}
///
/// Cancel a pending request (requester only) or dissolve an existing
/// relationship (either participant). Returns 204 No Content.
pub async fn remove(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let friendship = FriendshipRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Friendship",
                id,
            })
        })?;

    let is_participant = friendship.requester_id == auth_user.user_id
        || friendship.addressee_id == auth_user.user_id;
    if !is_participant {
        return Err(AppError::Core(CoreError::Forbidden(
            "Not a participant in this relationship".into(),
        )));
    }

    if friendship.status == FriendshipStatus::Pending.as_str()
        && friendship.requester_id != auth_user.user_id
    {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the requester can cancel a pending request".into(),
        )));
    }

    FriendshipRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/friends
///
/// The caller's accepted friends as display profiles.
pub async fn list_friends(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<UserProfile>>>> {
    let friend_ids = FriendshipRepo::accepted_friend_ids(&state.pool, auth_user.user_id).await?;
    let profiles = if friend_ids.is_empty() {
        vec![]
    } else {
        UserRepo::profiles_for(&state.pool, &friend_ids).await?
    };
    Ok(Json(DataResponse { data: profiles }))
}

/// GET /api/v1/friends/requests
///
/// Pending friend requests addressed to the caller, newest first.
pub async fn pending_requests(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Friendship>>>> {
    let requests = FriendshipRepo::pending_for_addressee(&state.pool, auth_user.user_id).await?;
    Ok(Json(DataResponse { data: requests }))
}
