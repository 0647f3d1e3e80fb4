//! Handlers for the `/notes` resource: notes, collaborators, and action
//! items.
//!
//! Change notifications go to the note resource channel and always exclude
//! the acting user, who already sees their own edit locally.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use confab_core::error::CoreError;
use confab_core::types::DbId;
use confab_db::models::note::{
    ActionItem, CreateActionItem, CreateNote, Note, NoteCollaborator, ShareNote, UpdateActionItem,
};
use confab_db::repositories::{ActionItemRepo, MeetingRepo, NoteRepo, UserRepo};
use confab_events::DomainEvent;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::actor_for;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PATCH /notes/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateNote {
    pub title: String,
}

/// POST /api/v1/notes
pub async fn create_note(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<CreateNote>,
) -> AppResult<(StatusCode, Json<DataResponse<Note>>)> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Note title must not be empty".into(),
        )));
    }

    // A note attached to a meeting must belong to one of its participants.
    if let Some(meeting_id) = input.meeting_id {
        if MeetingRepo::find_by_id(&state.pool, meeting_id).await?.is_none() {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Meeting",
                id: meeting_id,
            }));
        }
        if !MeetingRepo::is_participant(&state.pool, meeting_id, auth_user.user_id).await? {
            return Err(AppError::Core(CoreError::Forbidden(
                "Not a participant in this meeting".into(),
            )));
        }
    }

    let note = NoteRepo::create(
        &state.pool,
        auth_user.user_id,
        input.title.trim(),
        input.meeting_id,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: note })))
}

/// GET /api/v1/notes/{id}
pub async fn get_note(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Note>>> {
    let note = find_note(&state, id).await?;
    require_collaborator(&state, id, auth_user.user_id).await?;
    Ok(Json(DataResponse { data: note }))
}

/// PATCH /api/v1/notes/{id}
///
/// Rename a note (owner or collaborator). Subscribers of the note channel
/// are notified, excluding the editor.
pub async fn update_note(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateNote>,
) -> AppResult<Json<DataResponse<Note>>> {
    find_note(&state, id).await?;
    require_collaborator(&state, id, auth_user.user_id).await?;

    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Note title must not be empty".into(),
        )));
    }

    let updated = NoteRepo::rename(&state.pool, id, input.title.trim())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Note",
                id,
            })
        })?;

    let actor = actor_for(&state.pool, auth_user.user_id).await?;
    state.event_bus.publish(DomainEvent::NoteUpdated {
        note_id: updated.id,
        title: updated.title.clone(),
        actor,
    });

    Ok(Json(DataResponse { data: updated }))
}

/// POST /api/v1/notes/{id}/collaborators
///
/// Share a note (owner only). Re-sharing with an existing collaborator
/// conflicts.
pub async fn share(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(note_id): Path<DbId>,
    Json(input): Json<ShareNote>,
) -> AppResult<(StatusCode, Json<DataResponse<NoteCollaborator>>)> {
    let note = find_note(&state, note_id).await?;
    if note.owner_id != auth_user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the owner can share a note".into(),
        )));
    }
    if input.user_id == note.owner_id {
        return Err(AppError::Core(CoreError::Validation(
            "The owner is already a collaborator".into(),
        )));
    }
    if UserRepo::find_by_id(&state.pool, input.user_id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.user_id,
        }));
    }

    let collaborator = NoteRepo::add_collaborator(&state.pool, note_id, input.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "User is already a collaborator on this note".into(),
            ))
        })?;

    let actor = actor_for(&state.pool, auth_user.user_id).await?;
    state.event_bus.publish(DomainEvent::NoteShared {
        note_id,
        actor,
        collaborator_id: input.user_id,
    });

    Ok((StatusCode::CREATED, Json(DataResponse { data: collaborator })))
}

/// DELETE /api/v1/notes/{id}/collaborators/{user_id}
///
/// Remove a collaborator: the owner may remove anyone, a collaborator may
/// remove themselves. Returns 204 No Content.
pub async fn unshare(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((note_id, user_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let note = find_note(&state, note_id).await?;
    if note.owner_id != auth_user.user_id && user_id != auth_user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the owner can remove other collaborators".into(),
        )));
    }

    let removed = NoteRepo::remove_collaborator(&state.pool, note_id, user_id).await?;
    if !removed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Collaborator",
            id: user_id,
        }));
    }

    let actor = actor_for(&state.pool, auth_user.user_id).await?;
    state.event_bus.publish(DomainEvent::NoteUnshared {
        note_id,
        actor,
        collaborator_id: user_id,
    });

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/notes/{id}/action-items
pub async fn create_action_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(note_id): Path<DbId>,
    Json(input): Json<CreateActionItem>,
) -> AppResult<(StatusCode, Json<DataResponse<ActionItem>>)> {
    find_note(&state, note_id).await?;
    require_collaborator(&state, note_id, auth_user.user_id).await?;

    if input.content.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Action item content must not be empty".into(),
        )));
    }

    let item = ActionItemRepo::create(&state.pool, note_id, &input).await?;

    let actor = actor_for(&state.pool, auth_user.user_id).await?;
    state.event_bus.publish(DomainEvent::ActionItemCreated {
        note_id,
        actor,
        item: item.clone(),
    });

    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// GET /api/v1/notes/{id}/action-items
pub async fn list_action_items(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(note_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ActionItem>>>> {
    find_note(&state, note_id).await?;
    require_collaborator(&state, note_id, auth_user.user_id).await?;

    let items = ActionItemRepo::list_for_note(&state.pool, note_id).await?;
    Ok(Json(DataResponse { data: items }))
}

/// PATCH /api/v1/notes/action-items/{id}
pub async fn update_action_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateActionItem>,
) -> AppResult<Json<DataResponse<ActionItem>>> {
    let existing = find_action_item(&state, id).await?;
    require_collaborator(&state, existing.note_id, auth_user.user_id).await?;

    let updated = ActionItemRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Action item",
                id,
            })
        })?;

    let actor = actor_for(&state.pool, auth_user.user_id).await?;
    state.event_bus.publish(DomainEvent::ActionItemUpdated {
        note_id: updated.note_id,
        actor,
        item: updated.clone(),
    });

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/notes/action-items/{id}
pub async fn delete_action_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = find_action_item(&state, id).await?;
    require_collaborator(&state, existing.note_id, auth_user.user_id).await?;

    ActionItemRepo::delete(&state.pool, id).await?;

    let actor = actor_for(&state.pool, auth_user.user_id).await?;
    state.event_bus.publish(DomainEvent::ActionItemDeleted {
        note_id: existing.note_id,
        actor,
        item_id: id,
    });

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_note(state: &AppState, id: DbId) -> AppResult<Note> {
    NoteRepo::find_by_id(&state.pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Note",
            id,
        })
    })
}

async fn find_action_item(state: &AppState, id: DbId) -> AppResult<ActionItem> {
    ActionItemRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Action item",
                id,
            })
        })
}

async fn require_collaborator(state: &AppState, note_id: DbId, user_id: DbId) -> AppResult<()> {
    if NoteRepo::is_collaborator(&state.pool, note_id, user_id).await? {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "Not a collaborator on this note".into(),
        )))
    }
}
