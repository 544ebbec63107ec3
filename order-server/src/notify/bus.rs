//! In-process event bus backed by a tokio broadcast channel

use super::Notifier;
use shared::message::{Event, EventFrame, Room};
use tokio::sync::broadcast;

/// Fans events out to every subscriber (socket sessions filter by room)
#[derive(Clone, Debug)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<EventFrame>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventFrame> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl BroadcastNotifier {
    fn send(&self, frame: EventFrame) {
        let name = frame.event.name();
        let rooms = frame
            .rooms
            .iter()
            .map(Room::to_string)
            .collect::<Vec<_>>()
            .join(",");
        match self.tx.send(frame) {
            Ok(receivers) => {
                tracing::debug!(event = name, rooms = %rooms, receivers, "Event published");
            }
            Err(_) => {
                // No active listeners
                tracing::debug!(event = name, rooms = %rooms, "Event dropped: no subscribers");
            }
        }
    }
}

impl Notifier for BroadcastNotifier {
    fn publish(&self, room: Room, event: Event) {
        self.send(EventFrame::new(room, event));
    }

    fn publish_to(&self, rooms: &[Room], event: Event) {
        self.send(EventFrame::to_rooms(rooms.to_vec(), event));
    }
}

/// Notifier for environments without a real-time transport
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn publish(&self, room: Room, event: Event) {
        tracing::trace!(event = event.name(), room = %room, "Event discarded (no transport)");
    }
}
