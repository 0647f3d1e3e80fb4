//! Handlers for the `/meetings` resource: meetings, invitations, and
//! transcripts.
//!
//! Every mutation commits first and publishes its domain event after; a
//! lost event never rolls back the mutation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use confab_core::error::CoreError;
use confab_core::types::DbId;
use confab_db::models::friendship::RespondRequest;
use confab_db::models::meeting::{
    AppendTranscript, CreateMeeting, InviteUsers, Meeting, MeetingInvitation, TranscriptLine,
};
use confab_db::repositories::{InvitationRepo, MeetingRepo, TranscriptRepo, UserRepo};
use confab_events::DomainEvent;

use crate::error::{AppError, AppResult};
use crate::handlers::actor_for;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/meetings
pub async fn create_meeting(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<CreateMeeting>,
) -> AppResult<(StatusCode, Json<DataResponse<Meeting>>)> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Meeting title must not be empty".into(),
        )));
    }

    let meeting = MeetingRepo::create(&state.pool, auth_user.user_id, input.title.trim()).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: meeting })))
}

/// GET /api/v1/meetings/{id}
pub async fn get_meeting(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Meeting>>> {
    let meeting = find_meeting(&state, id).await?;
    require_participant(&state, id, auth_user.user_id).await?;
    Ok(Json(DataResponse { data: meeting }))
}

/// POST /api/v1/meetings/{id}/invitations
///
/// Invite users to a meeting (host only). Already-invited users are
/// skipped; the response contains only newly created invitations.
pub async fn invite(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(meeting_id): Path<DbId>,
    Json(input): Json<InviteUsers>,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<MeetingInvitation>>>)> {
    let meeting = find_meeting(&state, meeting_id).await?;
    if meeting.host_id != auth_user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the host can invite users".into(),
        )));
    }

    let mut created = Vec::with_capacity(input.user_ids.len());
    for user_id in input.user_ids {
        if user_id == meeting.host_id {
            continue;
        }
        if UserRepo::find_by_id(&state.pool, user_id).await?.is_none() {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "User",
                id: user_id,
            }));
        }
        if let Some(invitation) = InvitationRepo::invite(&state.pool, meeting_id, user_id).await? {
            created.push(invitation);
        }
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// POST /api/v1/meetings/invitations/{id}/respond
///
/// Accept or decline a pending invitation (invitee only). The host is
/// notified on their user channel.
pub async fn respond_invitation(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<RespondRequest>,
) -> AppResult<Json<DataResponse<MeetingInvitation>>> {
    let invitation = InvitationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Invitation",
                id,
            })
        })?;

    if invitation.user_id != auth_user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the invitee can respond to an invitation".into(),
        )));
    }

    let status = if input.accept { "accepted" } else { "declined" };
    let updated = InvitationRepo::respond(&state.pool, id, status)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "This invitation has already been responded to".into(),
            ))
        })?;

    let meeting = find_meeting(&state, updated.meeting_id).await?;
    let responder = actor_for(&state.pool, auth_user.user_id).await?;
    state.event_bus.publish(DomainEvent::InvitationResponded {
        meeting_id: meeting.id,
        meeting_title: meeting.title,
        host_id: meeting.host_id,
        responder,
        accepted: input.accept,
    });

    Ok(Json(DataResponse { data: updated }))
}

/// POST /api/v1/meetings/{id}/start
///
/// Mark the meeting live (host only, one-shot). Invitees whose effective
/// presence is online are paged by the notification router.
pub async fn start_meeting(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Meeting>>> {
    let meeting = find_meeting(&state, id).await?;
    if meeting.host_id != auth_user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the host can start the meeting".into(),
        )));
    }

    let started = MeetingRepo::start(&state.pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::Conflict("Meeting has already started".into()))
    })?;

    let invitee_ids = InvitationRepo::invitee_ids(&state.pool, id).await?;
    let host = actor_for(&state.pool, auth_user.user_id).await?;
    state.event_bus.publish(DomainEvent::MeetingStarted {
        meeting_id: started.id,
        meeting_title: started.title.clone(),
        host,
        invitee_ids,
    });

    Ok(Json(DataResponse { data: started }))
}

/// POST /api/v1/meetings/{id}/transcript
///
/// Append a transcript line to a live meeting (participants only). The
/// line fans out on the meeting resource channel.
pub async fn append_transcript(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(meeting_id): Path<DbId>,
    Json(input): Json<AppendTranscript>,
) -> AppResult<(StatusCode, Json<DataResponse<TranscriptLine>>)> {
    let meeting = find_meeting(&state, meeting_id).await?;
    require_participant(&state, meeting_id, auth_user.user_id).await?;

    if meeting.started_at.is_none() {
        return Err(AppError::Core(CoreError::Conflict(
            "Meeting has not started yet".into(),
        )));
    }
    if input.content.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Transcript content must not be empty".into(),
        )));
    }

    let line = TranscriptRepo::append(
        &state.pool,
        meeting_id,
        auth_user.user_id,
        &input.content,
        input.spoken_at,
    )
    .await?;

    state.event_bus.publish(DomainEvent::TranscriptAppended {
        meeting_id,
        line: line.clone(),
    });

    Ok((StatusCode::CREATED, Json(DataResponse { data: line })))
}

/// GET /api/v1/meetings/{id}/transcript
pub async fn list_transcript(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(meeting_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<TranscriptLine>>>> {
    find_meeting(&state, meeting_id).await?;
    require_participant(&state, meeting_id, auth_user.user_id).await?;

    let lines = TranscriptRepo::list_for_meeting(&state.pool, meeting_id).await?;
    Ok(Json(DataResponse { data: lines }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_meeting(state: &AppState, id: DbId) -> AppResult<Meeting> {
    MeetingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Meeting",
                id,
            })
        })
}

async fn require_participant(state: &AppState, meeting_id: DbId, user_id: DbId) -> AppResult<()> {
    if MeetingRepo::is_participant(&state.pool, meeting_id, user_id).await? {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "Not a participant in this meeting".into(),
        )))
    }
}
