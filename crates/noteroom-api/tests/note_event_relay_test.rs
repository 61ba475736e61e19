//! Note announcement relay: update-note / create-note fan-out over the
//! gateway, room isolation, and sender exclusion.

mod helpers;

use std::time::Duration;

use serde_json::json;

use helpers::{assert_silent, connect_ws, recv_json, send_json, spawn_server, WsStream};

async fn join(ws: &mut WsStream, room: &str, username: &str) {
    send_json(
        ws,
        &json!({"type": "join-room", "roomId": room, "username": username}),
    )
    .await;
    let _ = recv_json(ws).await;
}

#[tokio::test]
async fn test_update_note_reaches_room_peers_only() {
    let base = spawn_server().await;

    let mut alice = connect_ws(&base).await;
    join(&mut alice, "r1", "alice").await;
    let mut bob = connect_ws(&base).await;
    join(&mut bob, "r1", "bob").await;
    let _ = recv_json(&mut alice).await; // bob's join
    let mut carol = connect_ws(&base).await;
    join(&mut carol, "r2", "carol").await;

    send_json(
        &mut alice,
        &json!({
            "type": "update-note",
            "roomId": "r1",
            "noteId": "n-1",
            "content": "revised body",
            "username": "alice",
        }),
    )
    .await;

    let event = recv_json(&mut bob).await;
    assert_eq!(event["type"], "note-updated");
    assert_eq!(event["noteId"], "n-1");
    assert_eq!(event["content"], "revised body");
    assert_eq!(event["lastEditedBy"], "alice");

    // A different room hears nothing, and neither does the sender.
    assert_silent(&mut carol, Duration::from_millis(300)).await;
    assert_silent(&mut alice, Duration::from_millis(300)).await;
}

#[tokio::test]
async fn test_create_note_relayed_verbatim() {
    let base = spawn_server().await;

    let mut alice = connect_ws(&base).await;
    join(&mut alice, "r1", "alice").await;
    let mut bob = connect_ws(&base).await;
    join(&mut bob, "r1", "bob").await;
    let _ = recv_json(&mut alice).await;

    // The note payload is whatever the creating client got back from the
    // HTTP API; the gateway must not reshape it.
    let note = json!({
        "id": "0191a0b0-0000-7000-8000-000000000000",
        "title": "Standup agenda",
        "content": "- demos",
        "roomId": "r1",
        "createdBy": "alice",
        "lastEditedBy": "alice",
        "unknownClientField": 42,
    });
    send_json(
        &mut alice,
        &json!({
            "type": "create-note",
            "roomId": "r1",
            "note": note,
            "username": "alice",
        }),
    )
    .await;

    let event = recv_json(&mut bob).await;
    assert_eq!(event["type"], "note-created");
    assert_eq!(event["createdBy"], "alice");
    assert_eq!(event["note"], note);
}

#[tokio::test]
async fn test_relay_targets_the_stated_room() {
    let base = spawn_server().await;

    let mut alice = connect_ws(&base).await;
    join(&mut alice, "r1", "alice").await;
    let mut dana = connect_ws(&base).await;
    join(&mut dana, "r2", "dana").await;

    // The gateway relays to the room named in the frame, not the room the
    // sender joined — it validates nothing.
    send_json(
        &mut alice,
        &json!({
            "type": "update-note",
            "roomId": "r2",
            "noteId": "n-9",
            "content": "x",
            "username": "alice",
        }),
    )
    .await;

    let event = recv_json(&mut dana).await;
    assert_eq!(event["type"], "note-updated");
    assert_eq!(event["noteId"], "n-9");
}

#[tokio::test]
async fn test_malformed_frame_is_dropped_and_connection_survives() {
    let base = spawn_server().await;

    let mut alice = connect_ws(&base).await;
    join(&mut alice, "r1", "alice").await;
    let mut bob = connect_ws(&base).await;
    join(&mut bob, "r1", "bob").await;
    let _ = recv_json(&mut alice).await;

    send_json(&mut alice, &json!({"type": "no-such-event"})).await;

    // The bad frame is dropped silently; the connection still relays.
    send_json(
        &mut alice,
        &json!({
            "type": "update-note",
            "roomId": "r1",
            "noteId": "n-1",
            "content": "still alive",
            "username": "alice",
        }),
    )
    .await;

    let event = recv_json(&mut bob).await;
    assert_eq!(event["content"], "still alive");
}

#[tokio::test]
async fn test_update_before_join_is_ignored() {
    let base = spawn_server().await;

    let mut bob = connect_ws(&base).await;
    join(&mut bob, "r1", "bob").await;

    // A connection that never joined cannot broadcast into a room.
    let mut stranger = connect_ws(&base).await;
    send_json(
        &mut stranger,
        &json!({
            "type": "update-note",
            "roomId": "r1",
            "noteId": "n-1",
            "content": "sneaky",
            "username": "stranger",
        }),
    )
    .await;

    assert_silent(&mut bob, Duration::from_millis(300)).await;
}
