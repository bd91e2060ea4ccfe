//! # cronwalk
//!
//! A small library for parsing extended cron-style schedule expressions
//! and walking forward or backward from an anchor instant to the next
//! matching civil time.
//!
//! ## Features
//! - Seven schedule columns: second, minute, hour, day, month, weekday,
//!   year, with 5- and 6-column patterns promoted to the full form.
//! - `l` (last day of month) and `l<day>`/`l<day>-<day>` (ordinal-last
//!   weekday) markers, alongside the usual wildcards, ranges, steps, and
//!   comma lists.
//! - Forward and backward search from any anchor, both inclusive and
//!   exclusive of the anchor itself.
//! - Time zone aware through `chrono`'s `TimeZone` trait; DST transitions
//!   are resolved rather than left to panic or silently misfire.
//!
//! ## Crate Features
//! - `serde`: enables [`serde::Serialize`] and [`serde::Deserialize`] for
//!   [`Schedule`], serializing through its pattern string. Disabled by
//!   default.
//!
//! ## Example
//!
//! ```rust
//! use chrono::Utc;
//! use cronwalk::Schedule;
//!
//! // Every Friday at midnight.
//! let schedule = Schedule::new("0 0 * * fri").expect("valid schedule");
//! let now = Utc::now();
//!
//! let next = schedule.find_next(&now, false).unwrap();
//! let previous = schedule.find_previous(&now, false).unwrap();
//!
//! println!("\"{schedule}\" will next match at {next:?}");
//! println!("\"{schedule}\" last matched at {previous:?}");
//! ```

mod adapter;
mod errors;
mod iter;
mod matcher;
mod parser;
mod schedule;
mod steps;
mod walker;

pub use adapter::Anchor;
pub use errors::CronError;
pub use iter::ScheduleIter;
pub use matcher::{FieldKind, FieldMatcher};
pub use parser::{ScheduleParser, ScheduleParserBuilder};
pub use schedule::Schedule;

use chrono::{DateTime, TimeZone};

impl Schedule {
    /// The next instant `self` matches, strictly after `from` unless
    /// `inclusive` is true, in which case `from` itself is a candidate.
    /// Returns `Ok(None)` if the search runs off the supported 1970-2099
    /// calendar window without finding a match.
    pub fn find_next<Tz: TimeZone>(
        &self,
        from: &DateTime<Tz>,
        inclusive: bool,
    ) -> Result<Option<DateTime<Tz>>, CronError> {
        adapter::find_next(self, from, inclusive)
    }

    /// The previous instant `self` matches, strictly before `from` unless
    /// `inclusive` is true. Returns `Ok(None)` on exhaustion, same as
    /// [`Schedule::find_next`].
    pub fn find_previous<Tz: TimeZone>(
        &self,
        from: &DateTime<Tz>,
        inclusive: bool,
    ) -> Result<Option<DateTime<Tz>>, CronError> {
        adapter::find_previous(self, from, inclusive)
    }

    /// An iterator over successive matching instants, starting just after
    /// (or, if `inclusive`, at) `from` and walking forward.
    pub fn iter_after<Tz: TimeZone>(&self, from: &DateTime<Tz>, inclusive: bool) -> ScheduleIter<Tz> {
        ScheduleIter::forward(self.clone(), from.clone(), inclusive)
    }

    /// An iterator over successive matching instants, starting just before
    /// (or, if `inclusive`, at) `from` and walking backward.
    pub fn iter_before<Tz: TimeZone>(&self, from: &DateTime<Tz>, inclusive: bool) -> ScheduleIter<Tz> {
        ScheduleIter::backward(self.clone(), from.clone(), inclusive)
    }

    /// The Next query in its full boundary-adapter form: `anchor` accepts
    /// an epoch-seconds or naive civil instant (or `None` for "now"),
    /// `default_utc` selects how that anchor is interpreted, and `delta`
    /// selects a duration-in-seconds versus an absolute epoch-seconds
    /// result. Returns `Ok(None)` on exhaustion, same as [`Schedule::find_next`].
    pub fn next_seconds(
        &self,
        anchor: Option<Anchor>,
        default_utc: bool,
        delta: bool,
    ) -> Result<Option<f64>, CronError> {
        adapter::find_next_seconds(self, anchor, default_utc, delta)
    }

    /// The Previous-query counterpart of [`Schedule::next_seconds`].
    pub fn previous_seconds(
        &self,
        anchor: Option<Anchor>,
        default_utc: bool,
        delta: bool,
    ) -> Result<Option<f64>, CronError> {
        adapter::find_previous_seconds(self, anchor, default_utc, delta)
    }
}
