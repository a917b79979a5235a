use std::sync::RwLock;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Source of the current wall-clock time.
///
/// Scheduling rules compare against "today" and the current time-of-day in the
/// server's local time, so everything that needs "now" asks a `Clock` instead of
/// calling `Local::now()` directly.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    fn time_of_day(&self) -> NaiveTime {
        self.now().time()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    current: RwLock<NaiveDateTime>,
}

impl FixedClock {
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            current: RwLock::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }
}
