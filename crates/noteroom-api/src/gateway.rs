//! Realtime gateway: the WebSocket endpoint and per-connection state machine.
//!
//! A connection moves Connected-Unjoined → Joined(room, username) → Closed.
//! Until a `join-room` frame arrives nothing is tracked or broadcast; after
//! it, the connection is a pure relay endpoint — note announcements go to the
//! stated room's other participants, and transport closure removes the
//! participant and broadcasts `user-left`. The gateway never touches the
//! note store.

use std::sync::atomic::Ordering;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use noteroom_core::{new_v7, ClientEvent, ServerEvent};

use crate::AppState;

/// WebSocket handler: clients connect to `/ws` and exchange JSON text frames.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws_connection(socket, state))
}

async fn handle_ws_connection(socket: WebSocket, state: AppState) {
    let count = state.ws_connections.fetch_add(1, Ordering::Relaxed) + 1;
    tracing::info!(active = count, "realtime connection opened");

    drive_connection(socket, &state).await;

    let count = state.ws_connections.fetch_sub(1, Ordering::Relaxed) - 1;
    tracing::info!(active = count, "realtime connection closed");
}

async fn drive_connection(socket: WebSocket, state: &AppState) {
    let conn_id = new_v7();
    let (mut sender, mut receiver) = socket.split();

    // Connected-Unjoined: wait for join-room. A connection that closes here
    // was never a participant, so no broadcast occurs.
    let (room_id, username) = loop {
        match receiver.next().await {
            Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(ClientEvent::JoinRoom { room_id, username }) => break (room_id, username),
                Ok(event) => {
                    tracing::debug!(conn = %conn_id, event = event.event_type(), "event before join ignored");
                }
                Err(err) => {
                    tracing::debug!(conn = %conn_id, error = %err, "unparseable frame dropped");
                }
            },
            Some(Ok(Message::Close(_))) | None => return,
            Some(Ok(_)) => {} // Ping, Pong, Binary
            Some(Err(err)) => {
                tracing::debug!(conn = %conn_id, error = %err, "transport error before join");
                return;
            }
        }
    };

    // Joined: the subscription is taken before the user-joined broadcast, so
    // this client receives its own join frame first.
    let mut frames = state.rooms.join(&room_id, conn_id, &username);

    // Forward room frames to this client, skipping its own relays.
    let send_task = tokio::spawn(async move {
        let mut ping_interval = tokio::time::interval(std::time::Duration::from_secs(30));
        loop {
            tokio::select! {
                frame = frames.recv() => {
                    match frame {
                        Ok(frame) => {
                            if frame.origin == Some(conn_id) {
                                continue;
                            }
                            if let Ok(json) = serde_json::to_string(&frame.event) {
                                if sender.send(Message::Text(json)).await.is_err() {
                                    break;
                                }
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::debug!(conn = %conn_id, missed = n, "realtime client lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = ping_interval.tick() => {
                    if sender.send(Message::Ping(vec![])).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Relay note announcements from this client to the stated room.
    let rooms = state.rooms.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(ClientEvent::UpdateNote {
                        room_id,
                        note_id,
                        content,
                        username,
                    }) => {
                        rooms.relay(
                            &room_id,
                            conn_id,
                            ServerEvent::NoteUpdated {
                                note_id,
                                content,
                                last_edited_by: username,
                            },
                        );
                    }
                    Ok(ClientEvent::CreateNote {
                        room_id,
                        note,
                        username,
                    }) => {
                        rooms.relay(
                            &room_id,
                            conn_id,
                            ServerEvent::NoteCreated {
                                note,
                                created_by: username,
                            },
                        );
                    }
                    Ok(ClientEvent::JoinRoom { .. }) => {
                        // Room switch requires a new connection.
                        tracing::debug!(conn = %conn_id, "join-room while joined ignored");
                    }
                    Err(err) => {
                        tracing::debug!(conn = %conn_id, error = %err, "unparseable frame dropped");
                    }
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Either half finishing means the connection is done.
    tokio::select! {
        _ = send_task => {}
        _ = recv_task => {}
    }

    state.rooms.leave(&room_id, conn_id);
}
