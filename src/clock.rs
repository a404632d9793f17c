//! The single source of "today"

use chrono::{Duration, Local, NaiveDate};

/// Something that knows which day it is
pub trait Clock {
    /// Returns the current calendar date
    fn today(&self) -> NaiveDate;
}

/// The local wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock stuck on a given day, useful for tests
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// The seven days of the date strip: three days before `today`, `today`, and three days after
pub fn week_around(today: NaiveDate) -> Vec<NaiveDate> {
    (-3..=3)
        .map(|offset| today + Duration::days(offset))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_strip() {
        let today = NaiveDate::from_ymd(2024, 3, 1);
        let week = week_around(FixedClock(today).today());
        assert_eq!(week.len(), 7);
        assert_eq!(week[0], NaiveDate::from_ymd(2024, 2, 27));
        assert_eq!(week[3], today);
        assert_eq!(week[6], NaiveDate::from_ymd(2024, 3, 4));
    }
}
