//! The bidirectional search engine: given a schedule, an anchor instant,
//! and a direction, finds the nearest matching civil instant.
//!
//! Generalized to six steppable columns (seconds added, weekday excluded
//! — it is never stepped directly; day and weekday are both independent
//! requirements on the same Day gate, and stepping the day is how the
//! search explores different weekdays too) over a coarsest-to-finest
//! convergence loop.

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::errors::CronError;
use crate::schedule::Schedule;
use crate::steps::{self, TimeUnit, UNITS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Walks from `start` (exclusive) in `direction` until a civil instant
/// that `schedule` matches is found, or the search runs off the
/// 1970-2099 calendar window.
///
/// Repeatedly visits
/// columns coarsest-to-finest, and the moment a column doesn't match,
/// step it and reset every finer column, then restart from the coarsest
/// column. The loop terminates when every column matches simultaneously.
pub fn walk(
    schedule: &Schedule,
    start: NaiveDateTime,
    direction: Direction,
) -> Result<Option<NaiveDateTime>, CronError> {
    let first_step = match direction {
        Direction::Forward => steps::increment(TimeUnit::Second, start),
        Direction::Backward => steps::decrement(TimeUnit::Second, start),
    };
    let Some(mut candidate) = first_step else {
        return Ok(None);
    };

    // Columns visited coarsest-first so that a year rollover correctly
    // invalidates the month/day/hour/minute/second columns below it,
    // instead of fixing them prematurely.
    let order: Vec<TimeUnit> = UNITS.iter().rev().copied().collect();

    // An iteration budget, not a correctness mechanism: every real
    // non-exhausting schedule converges in a handful of steps, but a
    // pathological combination (e.g. Feb 30th) must terminate rather than
    // loop until the step functions themselves report exhaustion.
    let max_iterations = 4 * 366 * 24 * 60 * 60;
    let mut iterations = 0usize;

    'search: loop {
        iterations += 1;
        if iterations > max_iterations {
            return Err(CronError::Internal(
                "walker exceeded its iteration budget without converging".to_string(),
            ));
        }

        for &unit in &order {
            if field_matches(schedule, unit, candidate) {
                continue;
            }
            let stepped = match direction {
                Direction::Forward => steps::increment(unit, candidate),
                Direction::Backward => steps::decrement(unit, candidate),
            };
            let Some(stepped) = stepped else {
                return Ok(None);
            };
            candidate = match direction {
                Direction::Forward => steps::reset_forward(unit, stepped),
                Direction::Backward => steps::reset_backward(unit, stepped),
            };
            continue 'search;
        }

        // Every steppable column matched on this pass, so the full
        // predicate must agree too — `field_matches`'s Day arm already
        // folds in the weekday requirement, so this is a verification
        // pass, not a retry. Disagreement here is a bug in this module,
        // not a malformed schedule.
        if schedule.matches_naive(candidate) {
            return Ok(Some(candidate));
        }
        return Err(CronError::Internal(
            "walker converged on a candidate the schedule's membership predicate rejects"
                .to_string(),
        ));
    }
}

fn field_matches(schedule: &Schedule, unit: TimeUnit, dt: NaiveDateTime) -> bool {
    match unit {
        TimeUnit::Second => schedule.second().matches(dt.second(), dt),
        TimeUnit::Minute => schedule.minute().matches(dt.minute(), dt),
        TimeUnit::Hour => schedule.hour().matches(dt.hour(), dt),
        // Weekday has no steppable column of its own; it rides along with
        // Day, since advancing the day is the only way to reach a
        // different weekday. Day and weekday are independent requirements,
        // so both must accept the candidate.
        TimeUnit::Day => {
            let day_ok = schedule.day().any || schedule.day().matches(dt.day(), dt);
            let weekday_num = dt.weekday().num_days_from_sunday();
            let weekday_ok = schedule.weekday().any || schedule.weekday().matches(weekday_num, dt);
            day_ok && weekday_ok
        }
        TimeUnit::Month => schedule.month().matches(dt.month(), dt),
        TimeUnit::Year => schedule.year().matches(dt.year() as u32, dt),
    }
}
