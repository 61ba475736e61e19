//! Core traits for noteroom abstractions.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, decoupling the HTTP layer from the Postgres backend.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::Note;

/// Request for creating a new note.
///
/// The store sets `last_edited_by` to `created_by` and assigns both
/// timestamps.
#[derive(Debug, Clone)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
    pub room_id: String,
    pub created_by: String,
}

/// Request for updating a note's content.
///
/// Update is a destructive overwrite: only content and the editor attribution
/// change, and the previous content is not recoverable.
#[derive(Debug, Clone)]
pub struct UpdateNoteRequest {
    pub content: String,
    pub last_edited_by: String,
}

/// Repository for note CRUD operations.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a new note and return it with store-assigned id and timestamps.
    async fn insert(&self, req: CreateNoteRequest) -> Result<Note>;

    /// Fetch a note by id.
    async fn fetch(&self, id: Uuid) -> Result<Note>;

    /// List a room's notes in insertion order. An unknown room yields an
    /// empty list, never an error.
    async fn list_by_room(&self, room_id: &str) -> Result<Vec<Note>>;

    /// Replace a note's content and editor attribution, refreshing the
    /// updated timestamp. Returns the updated note.
    async fn update(&self, id: Uuid, req: UpdateNoteRequest) -> Result<Note>;

    /// Remove a note.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Check if a note exists.
    async fn exists(&self, id: Uuid) -> Result<bool>;
}
