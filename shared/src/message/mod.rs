//! Real-time event types
//!
//! Shared between order-server and socket clients. Every frame a client
//! receives is an [`EventFrame`]: `{"event": "...", "data": {...}}`.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod payload;
pub use payload::*;

/// Delivery scope of an event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Room {
    /// Clients following a single order (`order:<id>`)
    Order(i64),
    /// Admin sessions managing stock (`inventory`)
    InventoryManagement,
    /// Every connected client
    Broadcast,
}

impl Room {
    pub const INVENTORY: &'static str = "inventory";
    pub const BROADCAST: &'static str = "broadcast";

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            Self::INVENTORY => Some(Self::InventoryManagement),
            Self::BROADCAST => Some(Self::Broadcast),
            other => other
                .strip_prefix("order:")
                .and_then(|id| id.parse().ok())
                .map(Self::Order),
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Room::Order(id) => write!(f, "order:{id}"),
            Room::InventoryManagement => f.write_str(Self::INVENTORY),
            Room::Broadcast => f.write_str(Self::BROADCAST),
        }
    }
}

impl From<Room> for String {
    fn from(room: Room) -> Self {
        room.to_string()
    }
}

impl TryFrom<String> for Room {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Room::parse(&value).ok_or_else(|| format!("unknown room: {value}"))
    }
}

/// Event kinds carried over the socket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum Event {
    #[serde(rename = "order-update")]
    OrderUpdate(OrderUpdatePayload),
    #[serde(rename = "inventory-update")]
    InventoryUpdate(InventoryUpdatePayload),
    #[serde(rename = "inventory-alert")]
    InventoryAlert(InventoryAlertPayload),
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::OrderUpdate(_) => "order-update",
            Event::InventoryUpdate(_) => "inventory-update",
            Event::InventoryAlert(_) => "inventory-alert",
        }
    }
}

/// An event addressed to one or more rooms.
///
/// A listener in several of the rooms still receives the frame once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventFrame {
    pub rooms: Vec<Room>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventFrame {
    pub fn new(room: Room, event: Event) -> Self {
        Self {
            rooms: vec![room],
            event,
        }
    }

    pub fn to_rooms(rooms: Vec<Room>, event: Event) -> Self {
        Self { rooms, event }
    }

    pub fn is_addressed_to(&self, room: &Room) -> bool {
        self.rooms.contains(room)
    }
}

/// Client → server socket command
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ClientCommand {
    Join { room: Room },
    Leave { room: Room },
}
