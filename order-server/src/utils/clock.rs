//! Wall-clock abstraction
//!
//! Daily order numbers and tracking are partitioned by the restaurant's
//! local calendar day, so the workflow reads time through [`Clock`] and tests
//! can pin it.

use chrono::{Local, NaiveDate, NaiveDateTime};
use std::sync::{Arc, Mutex};

pub trait Clock: Send + Sync {
    /// Current local date-time
    fn now(&self) -> NaiveDateTime;

    /// Current timestamp in milliseconds
    fn now_millis(&self) -> i64 {
        shared::util::now_millis()
    }

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Settable clock for tests
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Calendar day key used for `order_date`
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
