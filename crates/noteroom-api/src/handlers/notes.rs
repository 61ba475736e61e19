//! Note CRUD handlers.
//!
//! All mutations are synchronous writes to the store; announcing a change to
//! other room members is the client's job, over the realtime gateway, after
//! the write succeeds.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use noteroom_core::{CreateNoteRequest, NoteRepository, UpdateNoteRequest};

use crate::{error::ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteBody {
    title: Option<String>,
    content: Option<String>,
    room_id: Option<String>,
    created_by: Option<String>,
}

pub async fn create_note(
    State(state): State<AppState>,
    Json(body): Json<CreateNoteBody>,
) -> Result<impl IntoResponse, ApiError> {
    let title = body
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("title is required".to_string()))?;
    let room_id = body
        .room_id
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("roomId is required".to_string()))?;
    let content = body
        .content
        .ok_or_else(|| ApiError::BadRequest("content is required".to_string()))?;
    let created_by = body
        .created_by
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("createdBy is required".to_string()))?;

    let note = state
        .db
        .notes
        .insert(CreateNoteRequest {
            title,
            content,
            room_id,
            created_by,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn list_room_notes(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let notes = state.db.notes.list_by_room(&room_id).await?;
    Ok(Json(notes))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteBody {
    content: Option<String>,
    last_edited_by: Option<String>,
}

pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateNoteBody>,
) -> Result<impl IntoResponse, ApiError> {
    // content may be an empty string, but the field must be present.
    let content = body
        .content
        .ok_or_else(|| ApiError::BadRequest("content is required".to_string()))?;
    let last_edited_by = body
        .last_edited_by
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("lastEditedBy is required".to_string()))?;

    let note = state
        .db
        .notes
        .update(
            id,
            UpdateNoteRequest {
                content,
                last_edited_by,
            },
        )
        .await?;

    Ok(Json(note))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.notes.delete(id).await?;
    Ok(Json(serde_json::json!({ "message": "Note removed" })))
}
