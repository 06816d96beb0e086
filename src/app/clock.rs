use std::cell::Cell;

use chrono::{DateTime, Local, NaiveDate, Utc};
use now::DateTimeNow;

// Source of "now" for task creation and of the local day used for bucketing
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    // The local calendar day containing `now`
    fn today(&self) -> NaiveDate {
        self.now()
            .with_timezone(&Local)
            .beginning_of_day()
            .date_naive()
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// A clock that only moves when told to. The starting day is pinned
// explicitly so results do not depend on the machine's time zone; after that
// the day rolls over each time `now` crosses a UTC midnight.
pub struct ManualClock {
    start: DateTime<Utc>,
    start_day: NaiveDate,
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>, today: NaiveDate) -> ManualClock {
        ManualClock {
            start: now,
            start_day: today,
            now: Cell::new(now),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }

    fn today(&self) -> NaiveDate {
        let days = self.now.get().date_naive() - self.start.date_naive();
        self.start_day + days
    }
}
