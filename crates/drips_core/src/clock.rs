use std::cell::Cell;
use std::rc::Rc;
use time::{Date, Duration, OffsetDateTime, UtcOffset};

/// Source of "now" for the store. Every operation that needs today's date
/// asks the clock again, so a session running past midnight rolls over.
pub trait Clock {
    fn now(&self) -> OffsetDateTime;

    fn today(&self) -> Date {
        self.now().date()
    }
}

/// Wall clock in the local offset, falling back to UTC when the offset cannot
/// be determined (the `time` crate refuses in multi-threaded processes).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(local_offset())
    }
}

pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

/// Settable clock for tests. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Rc<Cell<OffsetDateTime>>,
}

impl FixedClock {
    pub fn new(now: OffsetDateTime) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    pub fn set(&self, now: OffsetDateTime) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, FixedClock};
    use time::Duration;
    use time::macros::{date, datetime};

    #[test]
    fn fixed_clock_clones_share_time() {
        let clock = FixedClock::new(datetime!(2025-03-01 23:30 UTC));
        let handle = clock.clone();

        handle.advance(Duration::hours(1));

        assert_eq!(clock.today(), date!(2025 - 03 - 02));
        assert_eq!(clock.now(), datetime!(2025-03-02 00:30 UTC));
    }
}
