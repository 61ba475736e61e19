//! Core data models for noteroom.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A shared note, scoped to a room.
///
/// Serialized with the camelCase field names of the HTTP contract
/// (`roomId`, `createdBy`, `lastEditedBy`, ...). Timestamps are assigned by
/// the store; `room_id` is immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub room_id: String,
    pub created_by: String,
    pub last_edited_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A connected client inside a room.
///
/// `id` is the connection's UUIDv7 rendered as a string — the transient
/// connection handle. Usernames carry no uniqueness guarantee; two tabs with
/// the same name are two participants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub id: String,
    pub username: String,
}

impl Participant {
    /// Build a participant record for a connection.
    pub fn new(conn_id: Uuid, username: impl Into<String>) -> Self {
        Self {
            id: conn_id.to_string(),
            username: username.into(),
        }
    }
}
