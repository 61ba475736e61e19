//! Note repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use noteroom_core::{new_v7, CreateNoteRequest, Error, Note, NoteRepository, Result, UpdateNoteRequest};

/// PostgreSQL implementation of NoteRepository.
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_row_to_note(row: PgRow) -> Note {
    Note {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        room_id: row.get("room_id"),
        created_by: row.get("created_by"),
        last_edited_by: row.get("last_edited_by"),
        created_at: row.get("created_at_utc"),
        updated_at: row.get("updated_at_utc"),
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn insert(&self, req: CreateNoteRequest) -> Result<Note> {
        let id = new_v7();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO note (id, title, content, room_id, created_by, last_edited_by, created_at_utc, updated_at_utc)
             VALUES ($1, $2, $3, $4, $5, $5, $6, $6)",
        )
        .bind(id)
        .bind(&req.title)
        .bind(&req.content)
        .bind(&req.room_id)
        .bind(&req.created_by)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        tracing::debug!(note_id = %id, room = %req.room_id, "note created");

        Ok(Note {
            id,
            title: req.title,
            content: req.content,
            room_id: req.room_id,
            last_edited_by: req.created_by.clone(),
            created_by: req.created_by,
            created_at: now,
            updated_at: now,
        })
    }

    async fn fetch(&self, id: Uuid) -> Result<Note> {
        let row = sqlx::query(
            "SELECT id, title, content, room_id, created_by, last_edited_by, created_at_utc, updated_at_utc
             FROM note WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(map_row_to_note).ok_or(Error::NoteNotFound(id))
    }

    async fn list_by_room(&self, room_id: &str) -> Result<Vec<Note>> {
        // UUIDv7 primary keys are time-ordered, so this is insertion order.
        let rows = sqlx::query(
            "SELECT id, title, content, room_id, created_by, last_edited_by, created_at_utc, updated_at_utc
             FROM note WHERE room_id = $1 ORDER BY id",
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_row_to_note).collect())
    }

    async fn update(&self, id: Uuid, req: UpdateNoteRequest) -> Result<Note> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE note SET content = $1, last_edited_by = $2, updated_at_utc = $3 WHERE id = $4",
        )
        .bind(&req.content)
        .bind(&req.last_edited_by)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }

        tracing::debug!(note_id = %id, editor = %req.last_edited_by, "note updated");
        self.fetch(id).await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM note WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }

        tracing::debug!(note_id = %id, "note deleted");
        Ok(())
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM note WHERE id = $1) AS present")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.get("present"))
    }
}
