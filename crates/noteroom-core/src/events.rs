//! Realtime wire protocol: event types exchanged over the gateway socket.
//!
//! All frames are JSON text with a `"type"` tag using kebab-case event names
//! (`join-room`, `user-joined`, ...) and camelCase payload fields, matching
//! the HTTP contract. The gateway relays note events verbatim — `create-note`
//! carries its note payload as raw JSON and `noteId` is an opaque string, so
//! nothing is validated against the store.

use serde::{Deserialize, Serialize};

use crate::models::Participant;

/// Events a client sends to the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Bind this connection to a room under a display name.
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: String, username: String },
    /// Announce a content change already persisted via the HTTP API.
    #[serde(rename_all = "camelCase")]
    UpdateNote {
        room_id: String,
        note_id: String,
        content: String,
        username: String,
    },
    /// Announce a note already created via the HTTP API.
    #[serde(rename_all = "camelCase")]
    CreateNote {
        room_id: String,
        note: serde_json::Value,
        username: String,
    },
}

impl ClientEvent {
    /// Returns the wire-level event name (used for logging).
    pub fn event_type(&self) -> &'static str {
        match self {
            ClientEvent::JoinRoom { .. } => "join-room",
            ClientEvent::UpdateNote { .. } => "update-note",
            ClientEvent::CreateNote { .. } => "create-note",
        }
    }
}

/// Events the gateway broadcasts to a room's participants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// A participant joined; carries the full updated participant list.
    UserJoined {
        users: Vec<Participant>,
        message: String,
    },
    /// A participant left; carries the remaining participant list.
    UserLeft {
        users: Vec<Participant>,
        message: String,
    },
    /// A note's content changed (relayed from the editing client).
    #[serde(rename_all = "camelCase")]
    NoteUpdated {
        note_id: String,
        content: String,
        last_edited_by: String,
    },
    /// A new note appeared (relayed verbatim from the creating client).
    #[serde(rename_all = "camelCase")]
    NoteCreated {
        note: serde_json::Value,
        created_by: String,
    },
}

impl ServerEvent {
    /// Returns the wire-level event name (used for logging).
    pub fn event_type(&self) -> &'static str {
        match self {
            ServerEvent::UserJoined { .. } => "user-joined",
            ServerEvent::UserLeft { .. } => "user-left",
            ServerEvent::NoteUpdated { .. } => "note-updated",
            ServerEvent::NoteCreated { .. } => "note-created",
        }
    }
}
