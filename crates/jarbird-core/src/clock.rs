use chrono::Datelike;

/// Source of the current date for date-stamped descriptor fields.
pub trait Clock {
    fn year(&self) -> i32;
}

/// Wall clock in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn year(&self) -> i32 {
        chrono::Local::now().year()
    }
}

/// A clock frozen at a given year.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i32);

impl Clock for FixedClock {
    fn year(&self) -> i32 {
        self.0
    }
}
