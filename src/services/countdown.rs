use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Serialize;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Time left before registrations close
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Countdown {
    pub deadline: DateTime<Utc>,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    /// Split the time between `now` and `deadline`. Zero everywhere once the deadline is gone.
    pub fn until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let remaining = (deadline - now).num_seconds().max(0);

        Countdown {
            deadline,
            days: remaining / SECONDS_PER_DAY,
            hours: remaining % SECONDS_PER_DAY / 3600,
            minutes: remaining % 3600 / 60,
            seconds: remaining % 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CountdownService {
    deadline: Option<DateTime<Utc>>,
}

impl CountdownService {
    pub fn new(deadline: Option<DateTime<Utc>>) -> Self {
        Self { deadline }
    }

    pub fn deadline(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.deadline
            .or_else(|| default_deadline(now.year()))
            .unwrap_or(now)
    }

    #[tracing::instrument(skip(self), level = "debug")]
    pub fn countdown(&self, now: DateTime<Utc>) -> Countdown {
        Countdown::until(self.deadline(now), now)
    }
}

/// November 1st, midnight UTC
fn default_deadline(year: i32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, 11, 1, 0, 0, 0).single()
}
