//! Real-time rooms over WebSocket
//!
//! Clients send `{"action":"join","room":"order:<id>"}` or
//! `{"action":"leave","room":"inventory"}` and receive `{event, data}`
//! frames for the rooms they joined, plus every broadcast.

use std::collections::HashSet;

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use shared::message::{ClientCommand, EventFrame, Room};
use tokio::sync::broadcast::error::RecvError;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/ws", get(upgrade))
}

async fn upgrade(State(state): State<ServerState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| session(socket, state))
}

/// Rooms a session listens to; broadcast is implicit
#[derive(Debug, Default)]
pub struct Subscriptions {
    rooms: HashSet<Room>,
}

impl Subscriptions {
    pub fn apply(&mut self, command: ClientCommand) {
        match command {
            ClientCommand::Join { room } => {
                self.rooms.insert(room);
            }
            ClientCommand::Leave { room } => {
                self.rooms.remove(&room);
            }
        }
    }

    pub fn wants(&self, frame: &EventFrame) -> bool {
        frame.is_addressed_to(&Room::Broadcast)
            || self.rooms.iter().any(|room| frame.is_addressed_to(room))
    }
}

async fn session(socket: WebSocket, state: ServerState) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = state.events.subscribe();
    let mut subscriptions = Subscriptions::default();
    tracing::debug!("Socket session opened");

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "Socket receive error");
                        break;
                    }
                };
                match serde_json::from_str::<ClientCommand>(text.as_str()) {
                    Ok(command) => {
                        tracing::debug!(?command, "Socket command");
                        subscriptions.apply(command);
                    }
                    Err(e) => tracing::debug!(error = %e, "Ignoring malformed socket command"),
                }
            }
            event = events.recv() => {
                let frame = match event {
                    Ok(frame) => frame,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Socket session lagged, events dropped");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                if !subscriptions.wants(&frame) {
                    continue;
                }
                let payload = match serde_json::to_string(&frame.event) {
                    Ok(payload) => payload,
                    Err(e) => {
                        tracing::warn!(error = %e, event = frame.event.name(), "Failed to encode event");
                        continue;
                    }
                };
                if sender.send(Message::Text(payload.into())).await.is_err() {
                    break;
                }
            }
        }
    }

    tracing::debug!("Socket session closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::{Event, OrderUpdatePayload};
    use shared::models::OrderStatus;

    fn frame(room: Room) -> EventFrame {
        EventFrame::new(
            room,
            Event::OrderUpdate(OrderUpdatePayload {
                order_id: "ORD".into(),
                id: 1,
                message: "x".into(),
                status: OrderStatus::Pending,
                timestamp: 0,
            }),
        )
    }

    #[test]
    fn test_subscriptions_filter_rooms() {
        let mut subs = Subscriptions::default();
        assert!(subs.wants(&frame(Room::Broadcast)));
        assert!(!subs.wants(&frame(Room::Order(1))));

        subs.apply(ClientCommand::Join { room: Room::Order(1) });
        assert!(subs.wants(&frame(Room::Order(1))));
        assert!(!subs.wants(&frame(Room::Order(2))));
        assert!(!subs.wants(&frame(Room::InventoryManagement)));

        subs.apply(ClientCommand::Leave { room: Room::Order(1) });
        assert!(!subs.wants(&frame(Room::Order(1))));
    }

    #[test]
    fn test_alert_for_inventory_and_broadcast_is_one_frame() {
        let alert = EventFrame::to_rooms(
            vec![Room::InventoryManagement, Room::Broadcast],
            frame(Room::Broadcast).event,
        );
        let mut admin = Subscriptions::default();
        admin.apply(ClientCommand::Join {
            room: Room::InventoryManagement,
        });
        // A single frame: the admin session sends it once
        assert!(admin.wants(&alert));
        assert!(Subscriptions::default().wants(&alert));

        let inventory_only = EventFrame::new(Room::InventoryManagement, alert.event.clone());
        assert!(admin.wants(&inventory_only));
        assert!(!Subscriptions::default().wants(&inventory_only));
    }
}
