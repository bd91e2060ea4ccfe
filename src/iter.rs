//! A thin iterator wrapper over repeated [`crate::Schedule::find_next`] /
//! [`crate::Schedule::find_previous`] calls.
//!
//! Once the Next/Previous query exists, callers of a "cron" crate
//! expect to be able to iterate occurrences directly instead of
//! re-invoking the query by hand.

use chrono::{DateTime, Duration, TimeZone};

use crate::schedule::Schedule;
use crate::walker::Direction;

/// An iterator over a [`Schedule`]'s matching instants, walking in one
/// direction from a starting point.
pub struct ScheduleIter<Tz: TimeZone> {
    schedule: Schedule,
    direction: Direction,
    cursor: DateTime<Tz>,
    first_call: bool,
    inclusive: bool,
}

impl<Tz: TimeZone> ScheduleIter<Tz> {
    pub(crate) fn forward(schedule: Schedule, start: DateTime<Tz>, inclusive: bool) -> Self {
        Self {
            schedule,
            direction: Direction::Forward,
            cursor: start,
            first_call: true,
            inclusive,
        }
    }

    pub(crate) fn backward(schedule: Schedule, start: DateTime<Tz>, inclusive: bool) -> Self {
        Self {
            schedule,
            direction: Direction::Backward,
            cursor: start,
            first_call: true,
            inclusive,
        }
    }
}

impl<Tz: TimeZone> Iterator for ScheduleIter<Tz> {
    type Item = DateTime<Tz>;

    fn next(&mut self) -> Option<Self::Item> {
        let inclusive = self.first_call && self.inclusive;
        self.first_call = false;

        let found = match self.direction {
            Direction::Forward => self.schedule.find_next(&self.cursor, inclusive).ok()??,
            Direction::Backward => self.schedule.find_previous(&self.cursor, inclusive).ok()??,
        };

        self.cursor = match self.direction {
            Direction::Forward => found.clone() + Duration::seconds(1),
            Direction::Backward => found.clone() - Duration::seconds(1),
        };
        Some(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn forward_iterator_yields_successive_matches() {
        let schedule = Schedule::new("0 0 0 * * * *").unwrap();
        let start = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
        let days: Vec<_> = schedule.iter_after(&start, true).take(3).collect();
        assert_eq!(
            days,
            vec![
                Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2023, 6, 2, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2023, 6, 3, 0, 0, 0).unwrap(),
            ]
        );
    }

    #[test]
    fn backward_iterator_yields_successive_matches() {
        let schedule = Schedule::new("0 0 0 * * * *").unwrap();
        let start = Utc.with_ymd_and_hms(2023, 6, 3, 0, 0, 0).unwrap();
        let days: Vec<_> = schedule.iter_before(&start, true).take(3).collect();
        assert_eq!(
            days,
            vec![
                Utc.with_ymd_and_hms(2023, 6, 3, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2023, 6, 2, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap(),
            ]
        );
    }
}
