//! Time source used by the services.
//!
//! The age calculator takes its reference date as a parameter; services ask a [`Clock`] for
//! "today" so tests can pin the date.

use chrono::{DateTime, Local, NaiveDate, Utc};

pub trait Clock: Send + Sync {
    /// The current calendar date, without a timezone component.
    fn today(&self) -> NaiveDate;

    /// The current instant, used for record creation timestamps and session expiry.
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock. "Today" is the local calendar date.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// A clock whose "today" is `date`, at midnight UTC.
    pub fn on(date: NaiveDate) -> Self {
        Self {
            now: date.and_time(chrono::NaiveTime::MIN).and_utc(),
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
