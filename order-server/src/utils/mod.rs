//! Utilities: logging, time

pub mod clock;
pub mod logger;

pub use clock::{Clock, FixedClock, SystemClock, date_key};
