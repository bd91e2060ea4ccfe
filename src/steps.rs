//! Forward/backward increment and reset tables for the walker's search loop.
//!
//! Generalized to the seven-field grammar (seconds added, year bound
//! fixed at the 1970-2099 window) and expressed as named `fn` items
//! instead of closures, so each step is a plain, inspectable function.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::matcher::last_day_of_month;

/// Which column of the candidate instant a step operates on. Weekday is
/// omitted: the walker never steps the weekday field directly, it only
/// reads it as part of the Day column's combined gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

pub const UNITS: [TimeUnit; 6] = [
    TimeUnit::Second,
    TimeUnit::Minute,
    TimeUnit::Hour,
    TimeUnit::Day,
    TimeUnit::Month,
    TimeUnit::Year,
];

pub const YEAR_LOWER_LIMIT: i32 = 1970;
pub const YEAR_UPPER_LIMIT: i32 = 2099;

/// Bumps `unit` up by one and resets every finer column to its minimum.
/// Returns `None` if doing so would carry the year past
/// [`YEAR_UPPER_LIMIT`].
pub fn increment(unit: TimeUnit, dt: NaiveDateTime) -> Option<NaiveDateTime> {
    match unit {
        TimeUnit::Second => Some(with_time(dt, dt.hour(), dt.minute(), dt.second() + 1)),
        TimeUnit::Minute => Some(with_time(dt, dt.hour(), dt.minute() + 1, 0)),
        TimeUnit::Hour => Some(with_time(dt, dt.hour() + 1, 0, 0)),
        TimeUnit::Day => {
            let date = dt.date().succ_opt()?;
            Some(NaiveDateTime::new(date, NaiveTime::from_hms_opt(0, 0, 0)?))
        }
        TimeUnit::Month => increment_month(dt),
        TimeUnit::Year => increment_year(dt),
    }
}

/// Bumps `unit` down by one and resets every finer column to its maximum
/// (month-length-aware for days). Returns `None` past
/// [`YEAR_LOWER_LIMIT`].
pub fn decrement(unit: TimeUnit, dt: NaiveDateTime) -> Option<NaiveDateTime> {
    match unit {
        TimeUnit::Second => {
            if dt.second() == 0 {
                with_time_checked(dt, dt.hour(), dt.minute(), 59)
            } else {
                Some(with_time(dt, dt.hour(), dt.minute(), dt.second() - 1))
            }
        }
        TimeUnit::Minute => {
            if dt.minute() == 0 {
                with_time_checked(dt, dt.hour(), 59, 59)
            } else {
                Some(with_time(dt, dt.hour(), dt.minute() - 1, 59))
            }
        }
        TimeUnit::Hour => {
            if dt.hour() == 0 {
                Some(with_time(dt, 23, 59, 59))
            } else {
                Some(with_time(dt, dt.hour() - 1, 59, 59))
            }
        }
        TimeUnit::Day => {
            let date = dt.date().pred_opt()?;
            Some(NaiveDateTime::new(date, NaiveTime::from_hms_opt(23, 59, 59)?))
        }
        TimeUnit::Month => decrement_month(dt),
        TimeUnit::Year => decrement_year(dt),
    }
}

/// Resets every column finer than `unit` to its minimum, without
/// otherwise changing `unit` itself. Used when a coarser column just
/// advanced and the walker needs the finer columns to restart the search.
pub fn reset_forward(unit: TimeUnit, dt: NaiveDateTime) -> NaiveDateTime {
    match unit {
        TimeUnit::Second => dt,
        TimeUnit::Minute => with_time(dt, dt.hour(), dt.minute(), 0),
        TimeUnit::Hour => with_time(dt, dt.hour(), 0, 0),
        TimeUnit::Day => NaiveDateTime::new(dt.date(), NaiveTime::from_hms_opt(0, 0, 0).unwrap()),
        TimeUnit::Month => NaiveDate::from_ymd_opt(dt.year(), dt.month(), 1)
            .map(|d| NaiveDateTime::new(d, NaiveTime::from_hms_opt(0, 0, 0).unwrap()))
            .unwrap_or(dt),
        TimeUnit::Year => dt,
    }
}

/// The backward-direction counterpart of [`reset_forward`]: finer columns
/// reset to their maximum (last day of the relevant month for days).
pub fn reset_backward(unit: TimeUnit, dt: NaiveDateTime) -> NaiveDateTime {
    match unit {
        TimeUnit::Second => dt,
        TimeUnit::Minute => with_time(dt, dt.hour(), dt.minute(), 59),
        TimeUnit::Hour => with_time(dt, dt.hour(), 59, 59),
        TimeUnit::Day => NaiveDateTime::new(dt.date(), NaiveTime::from_hms_opt(23, 59, 59).unwrap()),
        TimeUnit::Month => {
            let last = last_day_of_month(dt.year(), dt.month());
            NaiveDate::from_ymd_opt(dt.year(), dt.month(), last)
                .map(|d| NaiveDateTime::new(d, NaiveTime::from_hms_opt(23, 59, 59).unwrap()))
                .unwrap_or(dt)
        }
        TimeUnit::Year => dt,
    }
}

fn with_time(dt: NaiveDateTime, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    // Overflowing one of hour/minute/second carries into the next coarser
    // unit; callers only ever overflow exactly one column at a time, so a
    // simple recursive carry is sufficient.
    if second >= 60 {
        return with_time(dt, hour, minute + 1, second - 60);
    }
    if minute >= 60 {
        return with_time(dt, hour + 1, minute - 60, second);
    }
    if hour >= 24 {
        let date = dt.date().succ_opt().unwrap_or(dt.date());
        return NaiveDateTime::new(
            date,
            NaiveTime::from_hms_opt(hour - 24, minute, second).unwrap(),
        );
    }
    NaiveDateTime::new(dt.date(), NaiveTime::from_hms_opt(hour, minute, second).unwrap())
}

fn with_time_checked(dt: NaiveDateTime, hour: u32, minute: u32, second: u32) -> Option<NaiveDateTime> {
    if hour == 0 && minute == 0 {
        let date = dt.date().pred_opt()?;
        return Some(NaiveDateTime::new(date, NaiveTime::from_hms_opt(23, 59, second)?));
    }
    if minute == 0 {
        return Some(with_time(dt, hour - 1, 59, second));
    }
    Some(with_time(dt, hour, minute - 1, second))
}

fn increment_month(dt: NaiveDateTime) -> Option<NaiveDateTime> {
    let (year, month) = if dt.month() == 12 {
        (dt.year() + 1, 1)
    } else {
        (dt.year(), dt.month() + 1)
    };
    if year > YEAR_UPPER_LIMIT {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(NaiveDateTime::new(date, NaiveTime::from_hms_opt(0, 0, 0)?))
}

fn decrement_month(dt: NaiveDateTime) -> Option<NaiveDateTime> {
    let (year, month) = if dt.month() == 1 {
        (dt.year() - 1, 12)
    } else {
        (dt.year(), dt.month() - 1)
    };
    if year < YEAR_LOWER_LIMIT {
        return None;
    }
    let last_day = last_day_of_month(year, month);
    let date = NaiveDate::from_ymd_opt(year, month, last_day)?;
    Some(NaiveDateTime::new(date, NaiveTime::from_hms_opt(23, 59, 59)?))
}

/// Advances the year by one, clamping the day-of-month if the original
/// day doesn't exist in the target year (Feb 29 on a non-leap year), using
/// a simple mod-4 leap check, valid within the 1970-2099 window since no
/// century-boundary year falls in it.
fn increment_year(dt: NaiveDateTime) -> Option<NaiveDateTime> {
    let year = dt.year() + 1;
    if year > YEAR_UPPER_LIMIT {
        return None;
    }
    let day = clamp_day(year, dt.month(), dt.day());
    let date = NaiveDate::from_ymd_opt(year, dt.month(), day)?;
    Some(NaiveDateTime::new(date, NaiveTime::from_hms_opt(0, 0, 0)?))
}

fn decrement_year(dt: NaiveDateTime) -> Option<NaiveDateTime> {
    let year = dt.year() - 1;
    if year < YEAR_LOWER_LIMIT {
        return None;
    }
    let day = clamp_day(year, dt.month(), dt.day());
    let date = NaiveDate::from_ymd_opt(year, dt.month(), day)?;
    Some(NaiveDateTime::new(date, NaiveTime::from_hms_opt(23, 59, 59)?))
}

fn clamp_day(year: i32, month: u32, day: u32) -> u32 {
    day.min(last_day_of_month(year, month))
}

/// True if `year` is a leap year under the proleptic Gregorian mod-4 rule,
/// sufficient for the 1970-2099 window (no century-boundary exception
/// falls inside it).
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn increment_month_wraps_into_next_year() {
        let d = dt(2023, 12, 15, 10, 0, 0);
        let next = increment_month(d).unwrap();
        assert_eq!(next, dt(2024, 1, 1, 0, 0, 0));
    }

    #[test]
    fn decrement_month_wraps_into_previous_year_at_last_day() {
        let d = dt(2023, 1, 15, 10, 0, 0);
        let prev = decrement_month(d).unwrap();
        assert_eq!(prev, dt(2022, 12, 31, 23, 59, 59));
    }

    #[test]
    fn increment_year_clamps_feb29_on_non_leap_target() {
        let d = dt(2024, 2, 29, 0, 0, 0);
        let next = increment_year(d).unwrap();
        assert_eq!(next, dt(2025, 2, 28, 0, 0, 0));
    }

    #[test]
    fn year_bounds_are_enforced() {
        assert!(increment_year(dt(2099, 6, 1, 0, 0, 0)).is_some());
        assert!(increment_year(dt(2099, 6, 1, 0, 0, 0))
            .map(|d| d.year())
            .unwrap()
            <= YEAR_UPPER_LIMIT);
        let at_limit = dt(YEAR_UPPER_LIMIT, 1, 1, 0, 0, 0);
        assert!(increment_year(at_limit).is_none());
        let at_floor = dt(YEAR_LOWER_LIMIT, 1, 1, 0, 0, 0);
        assert!(decrement_year(at_floor).is_none());
    }
}
