//! Notification Emitter
//!
//! Publishing is fire-and-forget: a delivery failure is logged inside the
//! notifier and never reaches the operation that produced the event.

mod bus;

pub use bus::{BroadcastNotifier, NoopNotifier};

use shared::message::{Event, Room};
use std::sync::Arc;

/// Sink for real-time events
pub trait Notifier: Send + Sync {
    /// Deliver `event` to every listener of `room`. Must not fail or block.
    fn publish(&self, room: Room, event: Event);

    /// Deliver `event` to the listeners of several rooms, once per listener
    fn publish_to(&self, rooms: &[Room], event: Event) {
        for room in rooms {
            self.publish(room.clone(), event.clone());
        }
    }
}

pub type SharedNotifier = Arc<dyn Notifier>;
