//! # noteroom-core
//!
//! Core types, traits, and abstractions for the noteroom server.
//!
//! This crate provides the foundational data structures, the realtime event
//! protocol, and the in-memory room registry that the other noteroom crates
//! depend on.

pub mod error;
pub mod events;
pub mod models;
pub mod rooms;
pub mod traits;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use events::{ClientEvent, ServerEvent};
pub use models::{Note, Participant};
pub use rooms::{RoomFrame, RoomRegistry};
pub use traits::{CreateNoteRequest, NoteRepository, UpdateNoteRequest};
pub use uuid_utils::{is_v7, new_v7};
