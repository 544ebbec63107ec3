//! Inventory: stock ledger and menu availability

pub mod availability;
pub mod ledger;

pub use availability::{Availability, AvailabilityRecalculator};
pub use ledger::StockLedger;
