//! Boundary adapter: converts between the caller's zoned/epoch/naive
//! instants and the civil `NaiveDateTime` the walker operates on, and
//! composes the DST offset correction on the way back out.
//!
//! Resolves an ambiguous or non-existent civil time produced by a DST
//! transition.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDateTime, TimeZone, Utc};

use crate::errors::CronError;
use crate::schedule::Schedule;
use crate::walker::{self, Direction};

/// How far a non-existent civil time (spring-forward gap) is searched
/// forward before giving up.
const GAP_SEARCH_LIMIT_SECONDS: i64 = 3600;

/// An anchor instant for [`find_next_seconds`]/[`find_previous_seconds`]
/// that has not yet been attached to a time zone. Resolved into a
/// `DateTime<Utc>` or `DateTime<Local>` at call time, selected by the
/// caller's `default_utc` flag — unlike the zoned `find_next`/
/// `find_previous` entry points, which already carry their own zone.
#[derive(Debug, Clone, Copy)]
pub enum Anchor {
    /// Seconds since the Unix epoch, with an optional fractional part.
    Epoch(f64),
    /// A civil instant with no attached zone.
    Naive(NaiveDateTime),
}

impl Anchor {
    fn resolve_utc(self) -> DateTime<Utc> {
        match self {
            Anchor::Epoch(secs) => epoch_to_datetime(secs),
            Anchor::Naive(naive) => Utc.from_utc_datetime(&naive),
        }
    }

    fn resolve_local(self) -> DateTime<Local> {
        match self {
            Anchor::Epoch(secs) => epoch_to_datetime(secs).with_timezone(&Local),
            Anchor::Naive(naive) => match Local.from_local_datetime(&naive) {
                LocalResult::Single(dt) => dt,
                LocalResult::Ambiguous(earliest, _latest) => earliest,
                LocalResult::None => Utc.from_utc_datetime(&naive).with_timezone(&Local),
            },
        }
    }
}

fn epoch_to_datetime(secs: f64) -> DateTime<Utc> {
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1_000_000_000.0).round() as u32;
    Utc.timestamp_opt(whole as i64, nanos)
        .single()
        .unwrap_or_else(|| Utc.timestamp_opt(whole as i64, 0).unwrap())
}

fn to_epoch_f64<Tz: TimeZone>(dt: &DateTime<Tz>) -> f64 {
    let utc = dt.with_timezone(&Utc);
    utc.timestamp() as f64 + utc.timestamp_subsec_nanos() as f64 / 1_000_000_000.0
}

/// Converts a duration to seconds with microsecond precision, matching
/// the `days·86400 + seconds + microseconds/10⁶` serialization.
fn duration_to_seconds(d: Duration) -> f64 {
    match d.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => d.num_seconds() as f64,
    }
}

/// Resolves a naive civil instant back into `tz`, handling the three
/// `chrono::LocalResult` outcomes of a zone transition:
///
/// - `Single`: the common case, used as-is.
/// - `Ambiguous(earliest, latest)`: a DST fall-back; this crate picks the
///   *earlier* of the two offsets, matching `chrono`'s own `.earliest()`
///   convention.
/// - `None`: a DST spring-forward gap; walk forward second-by-second
///   (bounded at one hour) until a representable instant appears.
pub fn resolve_naive<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> Result<DateTime<Tz>, CronError> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, _latest) => Ok(earliest),
        LocalResult::None => {
            let mut probe = naive;
            for _ in 0..GAP_SEARCH_LIMIT_SECONDS {
                probe += Duration::seconds(1);
                if let LocalResult::Single(dt) = tz.from_local_datetime(&probe) {
                    return Ok(dt);
                }
            }
            Err(CronError::InvalidTime)
        }
    }
}

/// Finds the next instant at or after `from` (depending on `inclusive`)
/// that `schedule` matches, expressed in `from`'s time zone.
pub fn find_next<Tz: TimeZone>(
    schedule: &Schedule,
    from: &DateTime<Tz>,
    inclusive: bool,
) -> Result<Option<DateTime<Tz>>, CronError> {
    find_occurrence(schedule, from, Direction::Forward, inclusive)
}

/// Finds the previous instant at or before `from` (depending on
/// `inclusive`) that `schedule` matches, expressed in `from`'s time zone.
pub fn find_previous<Tz: TimeZone>(
    schedule: &Schedule,
    from: &DateTime<Tz>,
    inclusive: bool,
) -> Result<Option<DateTime<Tz>>, CronError> {
    find_occurrence(schedule, from, Direction::Backward, inclusive)
}

fn find_occurrence<Tz: TimeZone>(
    schedule: &Schedule,
    from: &DateTime<Tz>,
    direction: Direction,
    inclusive: bool,
) -> Result<Option<DateTime<Tz>>, CronError> {
    let naive = from.naive_local();
    // `walker::walk` always steps past its start point; to make an
    // inclusive query also accept `from` itself, step one tick the other
    // way first so the walker's unconditional first step lands back on it.
    let search_start = if inclusive {
        match direction {
            Direction::Forward => naive - Duration::seconds(1),
            Direction::Backward => naive + Duration::seconds(1),
        }
    } else {
        naive
    };

    let Some(found) = walker::walk(schedule, search_start, direction)? else {
        return Ok(None);
    };

    let resolved = resolve_naive(found, &from.timezone())?;
    Ok(Some(resolved))
}

/// Finds the next match after `anchor` (or after "now" if `anchor` is
/// omitted), returning a duration in seconds (`delta=true`) or an
/// absolute epoch-seconds instant (`delta=false`).
///
/// `default_utc` selects how an `Anchor::Epoch`/`Anchor::Naive` value (and
/// an omitted anchor) is interpreted: as UTC, or as the local zone.
pub fn find_next_seconds(
    schedule: &Schedule,
    anchor: Option<Anchor>,
    default_utc: bool,
    delta: bool,
) -> Result<Option<f64>, CronError> {
    query_seconds(schedule, anchor, default_utc, Direction::Forward, delta)
}

/// The previous-match counterpart of [`find_next_seconds`].
pub fn find_previous_seconds(
    schedule: &Schedule,
    anchor: Option<Anchor>,
    default_utc: bool,
    delta: bool,
) -> Result<Option<f64>, CronError> {
    query_seconds(schedule, anchor, default_utc, Direction::Backward, delta)
}

/// The Next/Previous query has no "inclusive" concept of its own — the
/// walker always steps at least one tick away from the anchor.
fn query_seconds(
    schedule: &Schedule,
    anchor: Option<Anchor>,
    default_utc: bool,
    direction: Direction,
    delta: bool,
) -> Result<Option<f64>, CronError> {
    if default_utc {
        let from = anchor.map(Anchor::resolve_utc).unwrap_or_else(Utc::now);
        seconds_result(schedule, &from, direction, delta)
    } else {
        let from = anchor.map(Anchor::resolve_local).unwrap_or_else(Local::now);
        seconds_result(schedule, &from, direction, delta)
    }
}

fn seconds_result<Tz: TimeZone>(
    schedule: &Schedule,
    from: &DateTime<Tz>,
    direction: Direction,
    delta: bool,
) -> Result<Option<f64>, CronError> {
    let found = match direction {
        Direction::Forward => find_next(schedule, from, false)?,
        Direction::Backward => find_previous(schedule, from, false)?,
    };
    let Some(found) = found else {
        return Ok(None);
    };
    if delta {
        // `DateTime<Tz>::signed_duration_since` operates in UTC-instant
        // space, so this already carries the DST offset correction the
        // naive civil difference alone would miss.
        Ok(Some(duration_to_seconds(found.signed_duration_since(from.clone()))))
    } else {
        Ok(Some(to_epoch_f64(&found)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn inclusive_forward_accepts_the_anchor_itself() {
        let schedule = Schedule::new("0 0 0 * * * *").unwrap();
        let midnight = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
        let found = find_next(&schedule, &midnight, true).unwrap().unwrap();
        assert_eq!(found, midnight);
    }

    #[test]
    fn exclusive_forward_skips_the_anchor() {
        let schedule = Schedule::new("0 0 0 * * * *").unwrap();
        let midnight = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
        let found = find_next(&schedule, &midnight, false).unwrap().unwrap();
        assert_eq!(found, Utc.with_ymd_and_hms(2023, 6, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn exhaustion_returns_none_not_an_error() {
        let schedule = Schedule::new("0 0 0 30 2 ? *").unwrap();
        let anchor = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(find_next(&schedule, &anchor, false).unwrap(), None);
    }

    #[test]
    fn seconds_query_accepts_an_epoch_anchor() {
        let schedule = Schedule::new("0 * * * *").unwrap();
        // 2014-06-06T09:00:00Z
        let anchor = Anchor::Epoch(1_402_045_200.0);
        let delta = find_next_seconds(&schedule, Some(anchor), true, true)
            .unwrap()
            .unwrap();
        assert_eq!(delta, 3600.0);
    }

    #[test]
    fn seconds_query_accepts_a_naive_anchor_under_utc() {
        let schedule = Schedule::new("0 * * * *").unwrap();
        let naive = Utc
            .with_ymd_and_hms(2014, 6, 6, 9, 0, 0)
            .unwrap()
            .naive_utc();
        let delta = find_next_seconds(&schedule, Some(Anchor::Naive(naive)), true, true)
            .unwrap()
            .unwrap();
        assert_eq!(delta, 3600.0);
    }

    #[test]
    fn seconds_query_absolute_form_returns_epoch_seconds() {
        let schedule = Schedule::new("0 * * * *").unwrap();
        let anchor = Anchor::Epoch(1_402_045_200.0);
        let absolute = find_next_seconds(&schedule, Some(anchor), true, false)
            .unwrap()
            .unwrap();
        assert_eq!(absolute, 1_402_045_200.0 + 3600.0);
    }

    #[test]
    fn seconds_query_with_no_anchor_uses_now() {
        let schedule = Schedule::new("* * * * *").unwrap();
        let delta = find_next_seconds(&schedule, None, true, true).unwrap().unwrap();
        assert!(delta > 0.0 && delta <= 60.0);
    }

    #[test]
    fn seconds_query_previous_direction_returns_a_negative_delta() {
        let schedule = Schedule::new("0 * * * *").unwrap();
        let anchor = Anchor::Epoch(1_402_045_200.0);
        let delta = find_previous_seconds(&schedule, Some(anchor), true, true)
            .unwrap()
            .unwrap();
        assert!(delta < 0.0);
    }
}
