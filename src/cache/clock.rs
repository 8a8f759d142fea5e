//! Clock Module
//!
//! Time source for entry timestamps and expiry checks.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use chrono::Utc;

/// Supplies the current Unix time in milliseconds.
pub trait Clock: fmt::Debug {
    fn now_millis(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

// == Manual Clock ==
/// Clock moved by hand. Clones share the same reading.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Rc<Cell<i64>>,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_millis)),
        }
    }

    pub fn advance(&self, millis: i64) {
        self.now.set(self.now.get() + millis);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.get()
    }
}
