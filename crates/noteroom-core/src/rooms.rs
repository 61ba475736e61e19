//! Process-wide room registry and per-room broadcast fan-out.
//!
//! Rooms are lazily materialized: an entry appears when the first participant
//! joins and is dropped when the last one leaves, so an absent entry is an
//! empty room, not an error. The registry is empty at process start and never
//! persisted.
//!
//! Each room owns a `tokio::sync::broadcast` channel. Presence events
//! (user-joined / user-left) are delivered to every subscriber including the
//! actor; note relays are tagged with the originating connection so each
//! connection's send loop can skip its own frames. Slow receivers that fall
//! behind get a `Lagged` error and miss frames — real-time freshness over
//! completeness, no delivery guarantee.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::events::ServerEvent;
use crate::models::Participant;

/// One broadcast unit inside a room channel.
///
/// `origin` is `None` for presence events (deliver to everyone) and the
/// sender's connection id for note relays (skipped by the sender).
#[derive(Debug, Clone)]
pub struct RoomFrame {
    pub origin: Option<Uuid>,
    pub event: ServerEvent,
}

struct Room {
    tx: broadcast::Sender<RoomFrame>,
    /// Participants in join order.
    participants: Vec<Participant>,
}

impl Room {
    fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            participants: Vec::new(),
        }
    }
}

/// In-memory registry mapping room id → connected participants.
///
/// All mutations happen under one mutex, held only across synchronous map
/// operations (never across an await), which serializes join/leave/relay
/// under a multi-threaded runtime.
pub struct RoomRegistry {
    capacity: usize,
    rooms: Mutex<HashMap<String, Room>>,
}

impl RoomRegistry {
    /// Create an empty registry with the given per-room broadcast capacity.
    ///
    /// Recommended: 256 for production, 32 for tests.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            rooms: Mutex::new(HashMap::new()),
        }
    }

    fn rooms(&self) -> MutexGuard<'_, HashMap<String, Room>> {
        // A panic while holding the lock leaves plain data behind; recover it.
        self.rooms.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a connection to a room and broadcast `user-joined` to all
    /// participants, the joiner included.
    ///
    /// The returned receiver is subscribed before the broadcast, so the
    /// joiner's own `user-joined` frame is the first thing it receives.
    pub fn join(
        &self,
        room_id: &str,
        conn_id: Uuid,
        username: &str,
    ) -> broadcast::Receiver<RoomFrame> {
        let mut rooms = self.rooms();
        let room = rooms
            .entry(room_id.to_string())
            .or_insert_with(|| Room::new(self.capacity));

        let rx = room.tx.subscribe();
        room.participants.push(Participant::new(conn_id, username));

        let users = room.participants.clone();
        tracing::info!(
            room = room_id,
            user = username,
            participants = users.len(),
            "participant joined"
        );
        let _ = room.tx.send(RoomFrame {
            origin: None,
            event: ServerEvent::UserJoined {
                users,
                message: format!("{} joined the room", username),
            },
        });
        rx
    }

    /// Remove a connection from a room.
    ///
    /// Broadcasts `user-left` to the remaining participants; drops the room
    /// entry entirely when the last participant leaves. A connection that was
    /// never joined is a no-op.
    pub fn leave(&self, room_id: &str, conn_id: Uuid) {
        let mut rooms = self.rooms();
        let Some(room) = rooms.get_mut(room_id) else {
            return;
        };
        let id = conn_id.to_string();
        let Some(pos) = room.participants.iter().position(|p| p.id == id) else {
            return;
        };
        let who = room.participants.remove(pos);

        if room.participants.is_empty() {
            rooms.remove(room_id);
            tracing::info!(room = room_id, user = %who.username, "last participant left, room dropped");
            return;
        }

        let users = room.participants.clone();
        tracing::info!(
            room = room_id,
            user = %who.username,
            participants = users.len(),
            "participant left"
        );
        let _ = room.tx.send(RoomFrame {
            origin: None,
            event: ServerEvent::UserLeft {
                users,
                message: format!("{} left the room", who.username),
            },
        });
    }

    /// Relay a note event to the stated room, tagged with the sender so its
    /// own send loop skips it. Silently dropped if the room has no
    /// participants — fire and forget.
    pub fn relay(&self, room_id: &str, origin: Uuid, event: ServerEvent) {
        let rooms = self.rooms();
        if let Some(room) = rooms.get(room_id) {
            tracing::debug!(room = room_id, event = event.event_type(), "relaying");
            let _ = room.tx.send(RoomFrame {
                origin: Some(origin),
                event,
            });
        } else {
            tracing::debug!(room = room_id, event = event.event_type(), "relay to empty room dropped");
        }
    }

    /// Snapshot of a room's participants, in join order. Empty if the room
    /// does not exist.
    pub fn participants(&self, room_id: &str) -> Vec<Participant> {
        self.rooms()
            .get(room_id)
            .map(|r| r.participants.clone())
            .unwrap_or_default()
    }

    /// Number of rooms with at least one participant.
    pub fn room_count(&self) -> usize {
        self.rooms().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uuid_utils::new_v7;

    fn recv_event(rx: &mut broadcast::Receiver<RoomFrame>) -> ServerEvent {
        rx.try_recv().expect("expected a pending frame").event
    }

    #[tokio::test]
    async fn test_join_broadcasts_to_joiner_and_existing() {
        let registry = RoomRegistry::new(32);
        let alice = new_v7();
        let bob = new_v7();

        let mut alice_rx = registry.join("r1", alice, "alice");
        match recv_event(&mut alice_rx) {
            ServerEvent::UserJoined { users, message } => {
                assert_eq!(users.len(), 1);
                assert_eq!(users[0].username, "alice");
                assert_eq!(message, "alice joined the room");
            }
            other => panic!("expected user-joined, got {}", other.event_type()),
        }

        let mut bob_rx = registry.join("r1", bob, "bob");

        // Both alice and bob see the updated two-user list.
        for rx in [&mut alice_rx, &mut bob_rx] {
            match recv_event(rx) {
                ServerEvent::UserJoined { users, message } => {
                    let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
                    assert_eq!(names, ["alice", "bob"]);
                    assert_eq!(message, "bob joined the room");
                }
                other => panic!("expected user-joined, got {}", other.event_type()),
            }
        }
    }

    #[tokio::test]
    async fn test_leave_broadcasts_remaining_list() {
        let registry = RoomRegistry::new(32);
        let alice = new_v7();
        let bob = new_v7();

        let mut alice_rx = registry.join("r1", alice, "alice");
        let mut bob_rx = registry.join("r1", bob, "bob");
        // Drain the join frames.
        let _ = recv_event(&mut alice_rx);
        let _ = recv_event(&mut alice_rx);
        let _ = recv_event(&mut bob_rx);

        registry.leave("r1", alice);
        match recv_event(&mut bob_rx) {
            ServerEvent::UserLeft { users, message } => {
                assert_eq!(users.len(), 1);
                assert_eq!(users[0].username, "bob");
                assert_eq!(message, "alice left the room");
            }
            other => panic!("expected user-left, got {}", other.event_type()),
        }
    }

    #[tokio::test]
    async fn test_last_leave_drops_room() {
        let registry = RoomRegistry::new(32);
        let alice = new_v7();

        let _rx = registry.join("r1", alice, "alice");
        assert_eq!(registry.room_count(), 1);

        registry.leave("r1", alice);
        assert_eq!(registry.room_count(), 0);
        assert!(registry.participants("r1").is_empty());
    }

    #[tokio::test]
    async fn test_leave_without_join_is_noop() {
        let registry = RoomRegistry::new(32);
        registry.leave("r1", new_v7());
        assert_eq!(registry.room_count(), 0);
    }

    #[tokio::test]
    async fn test_relay_is_tagged_with_origin() {
        let registry = RoomRegistry::new(32);
        let alice = new_v7();
        let bob = new_v7();

        let mut alice_rx = registry.join("r1", alice, "alice");
        let mut bob_rx = registry.join("r1", bob, "bob");
        let _ = alice_rx.try_recv();
        let _ = alice_rx.try_recv();
        let _ = bob_rx.try_recv();

        registry.relay(
            "r1",
            alice,
            ServerEvent::NoteUpdated {
                note_id: "n-1".to_string(),
                content: "new body".to_string(),
                last_edited_by: "alice".to_string(),
            },
        );

        // Both receivers get the frame; the origin tag is what lets the
        // sender's send loop drop it.
        let frame = bob_rx.try_recv().unwrap();
        assert_eq!(frame.origin, Some(alice));
        let frame = alice_rx.try_recv().unwrap();
        assert_eq!(frame.origin, Some(alice));
    }

    #[tokio::test]
    async fn test_relay_does_not_cross_rooms() {
        let registry = RoomRegistry::new(32);
        let alice = new_v7();
        let carol = new_v7();

        let mut alice_rx = registry.join("r1", alice, "alice");
        let mut carol_rx = registry.join("r2", carol, "carol");
        let _ = alice_rx.try_recv();
        let _ = carol_rx.try_recv();

        registry.relay(
            "r1",
            alice,
            ServerEvent::NoteUpdated {
                note_id: "n-1".to_string(),
                content: "x".to_string(),
                last_edited_by: "alice".to_string(),
            },
        );

        assert!(alice_rx.try_recv().is_ok());
        assert!(carol_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_relay_to_unknown_room_is_dropped() {
        let registry = RoomRegistry::new(32);
        // Must not panic or create a room.
        registry.relay(
            "ghost",
            new_v7(),
            ServerEvent::NoteUpdated {
                note_id: "n".to_string(),
                content: String::new(),
                last_edited_by: "a".to_string(),
            },
        );
        assert_eq!(registry.room_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_usernames_are_distinct_participants() {
        let registry = RoomRegistry::new(32);
        let tab1 = new_v7();
        let tab2 = new_v7();

        let _rx1 = registry.join("r1", tab1, "alice");
        let _rx2 = registry.join("r1", tab2, "alice");

        let users = registry.participants("r1");
        assert_eq!(users.len(), 2);
        assert_ne!(users[0].id, users[1].id);

        registry.leave("r1", tab1);
        let users = registry.participants("r1");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, tab2.to_string());
    }
}
