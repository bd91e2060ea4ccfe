//! Single-column parsing and membership testing.
//!
//! A [`FieldMatcher`] parses one column of a schedule string (`"*/15"`,
//! `"mon-fri"`, `"l"`, `"l3-5"`, ...) into the set of integers it accepts,
//! plus the handful of special markers (`last-of-month`, `ordinal-last
//! weekday`) that depend on the candidate instant rather than a fixed set.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::errors::CronError;

/// Which column a [`FieldMatcher`] was built for. Determines both the
/// legal range and which special syntax (`?`, `l`, `l<d>`) is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKind {
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Weekday,
    Year,
}

impl FieldKind {
    /// Inclusive `(min, max)` for the column, in this grammar.
    /// For `Weekday` this is the POSIX range (0-6); the parser separately
    /// allows 7 as an alias for Sunday before normalizing it to 0.
    pub fn range(self) -> (u32, u32) {
        match self {
            Self::Second | Self::Minute => (0, 59),
            Self::Hour => (0, 23),
            Self::Day => (1, 31),
            Self::Month => (1, 12),
            Self::Weekday => (0, 6),
            Self::Year => (1970, 2099),
        }
    }

    fn alias(self, token: &str) -> Option<u32> {
        match self {
            Self::Month => MONTH_ALIASES
                .iter()
                .find(|(name, _)| *name == token)
                .map(|(_, v)| *v),
            Self::Weekday => WEEKDAY_ALIASES
                .iter()
                .find(|(name, _)| *name == token)
                .map(|(_, v)| *v),
            _ => None,
        }
    }
}

const MONTH_ALIASES: [(&str, u32); 12] = [
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("may", 5),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
];

const WEEKDAY_ALIASES: [(&str, u32); 7] = [
    ("sun", 0),
    ("mon", 1),
    ("tue", 2),
    ("wed", 3),
    ("thu", 4),
    ("fri", 5),
    ("sat", 6),
];

/// Parsed form of one schedule column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldMatcher {
    pub kind: FieldKind,
    /// Lowercased, trimmed source text for this column.
    pub input: String,
    /// The comma-split pieces, in source order.
    pub pieces: Vec<String>,
    /// Every in-range integer this column accepts outright (fast path
    /// when `any` is false). Ordinal-last weekday pieces are *not*
    /// folded in here — they live in `weekday_last`.
    pub allowed: BTreeSet<u32>,
    /// True if any piece is `*` or `?`.
    pub any: bool,
    /// Declared upper bound, used for matcher ordering comparisons.
    pub end: u32,
    /// Built in wrap-around mode (a `start > end` range wraps through the
    /// field modulus instead of erroring).
    pub loop_mode: bool,
    /// Weekday-only: inclusive `(start, end)` day-number ranges taken
    /// from `l<d>`/`l<d>-<e>` pieces, both ends already 7-normalized to 0.
    pub weekday_last: Vec<(u32, u32)>,
    /// Day-only: a bare `l` piece was present.
    pub day_last: bool,
}

impl FieldMatcher {
    /// Parses one column. `loop_mode` enables wrap-around range semantics
    /// ; it is meaningful for every column but in practice
    /// only ever turned on for the seconds column, by random-second mode.
    pub fn parse(kind: FieldKind, column: &str, loop_mode: bool) -> Result<Self, CronError> {
        let input = column.trim().to_lowercase();
        if input.is_empty() {
            return Err(CronError::InvalidSyntax(format!(
                "empty {kind:?} field"
            )));
        }
        let pieces: Vec<String> = input.split(',').map(|p| p.trim().to_string()).collect();
        if pieces.iter().any(String::is_empty) {
            return Err(CronError::InvalidSyntax(format!(
                "empty piece in {kind:?} field {input:?}"
            )));
        }

        let (min, max) = kind.range();
        let any = pieces.iter().any(|p| p == "*" || p == "?");
        if any {
            if let Some(q) = pieces.iter().find(|p| p.as_str() == "?") {
                if !matches!(kind, FieldKind::Day | FieldKind::Weekday) {
                    let _ = q;
                    return Err(CronError::QuestionMarkNotAllowed);
                }
            }
        }

        let mut allowed = BTreeSet::new();
        let mut weekday_last = Vec::new();
        let mut day_last = false;

        for piece in &pieces {
            if piece == "*" || piece == "?" {
                continue;
            }
            if piece == "l" {
                if kind != FieldKind::Day {
                    return Err(CronError::LastDayNotAllowed);
                }
                day_last = true;
                continue;
            }
            if let Some(rest) = piece.strip_prefix('l') {
                if kind != FieldKind::Weekday {
                    return Err(CronError::OrdinalWeekdayNotAllowed);
                }
                if rest.is_empty() {
                    return Err(CronError::InvalidSyntax(
                        "'l' in the weekday field requires a day number".to_string(),
                    ));
                }
                weekday_last.push(Self::parse_dayref(rest)?);
                continue;
            }
            Self::parse_range_piece(kind, piece, min, max, loop_mode, &mut allowed)?;
        }

        Ok(Self {
            kind,
            input,
            pieces,
            allowed,
            any,
            end: if kind == FieldKind::Weekday { 7 } else { max },
            loop_mode,
            weekday_last,
            day_last,
        })
    }

    /// `dayref := int | int "-" int`, both ends normalized 7 -> 0.
    fn parse_dayref(s: &str) -> Result<(u32, u32), CronError> {
        if let Some((a, b)) = s.split_once('-') {
            let start = Self::parse_weekday_number(a)?;
            let end = Self::parse_weekday_number(b)?;
            if start > end {
                return Err(CronError::InvalidSyntax(format!(
                    "ordinal weekday range {s:?} has start greater than end"
                )));
            }
            Ok((start, end))
        } else {
            let d = Self::parse_weekday_number(s)?;
            Ok((d, d))
        }
    }

    fn parse_weekday_number(s: &str) -> Result<u32, CronError> {
        let v: u32 = s
            .parse()
            .map_err(|_| CronError::InvalidSyntax(format!("invalid ordinal weekday {s:?}")))?;
        let v = if v == 7 { 0 } else { v };
        if v > 6 {
            return Err(CronError::OutOfRange(format!(
                "ordinal weekday {s:?} out of range 0-7"
            )));
        }
        Ok(v)
    }

    fn resolve_atom(kind: FieldKind, token: &str) -> Result<u32, CronError> {
        if let Ok(v) = token.parse::<u32>() {
            return Ok(v);
        }
        kind.alias(token)
            .ok_or_else(|| CronError::InvalidSyntax(format!("unknown value {token:?}")))
    }

    /// Parses `range := "*" | value | value "-" value` optionally followed
    /// by `"/" step`, inserting the resulting values into `allowed`.
    fn parse_range_piece(
        kind: FieldKind,
        piece: &str,
        min: u32,
        max: u32,
        loop_mode: bool,
        allowed: &mut BTreeSet<u32>,
    ) -> Result<(), CronError> {
        let (range_part, step) = match piece.split_once('/') {
            Some((r, s)) => {
                let step: u32 = s
                    .parse()
                    .map_err(|_| CronError::InvalidSyntax(format!("invalid step {s:?}")))?;
                if step == 0 {
                    return Err(CronError::OutOfRange("step must be positive".to_string()));
                }
                if step > max {
                    return Err(CronError::OutOfRange(format!(
                        "step {step} exceeds field upper limit {max}"
                    )));
                }
                (r, Some(step))
            }
            None => (piece, None),
        };

        // end_limit allows month/weekday aliases whose numeric alias is 0
        // (Sunday) to serve as a range end, promoted to one past the
        // declared max so "sat-sun" can expand to {6, 0}.
        let end_limit = if kind == FieldKind::Weekday { 7 } else { max };

        let (start, end): (u32, u32) = if range_part == "*" {
            (min, max)
        } else if let Some((a, b)) = range_part.split_once('-') {
            let s = Self::resolve_atom(kind, a)?;
            let mut e = Self::resolve_atom(kind, b)?;
            if kind == FieldKind::Weekday && e == 0 && b != "0" {
                e = 7;
            }
            if s < min || e > end_limit {
                return Err(CronError::OutOfRange(format!(
                    "range {piece:?} out of bounds [{min}, {end_limit}]"
                )));
            }
            if s > e && !loop_mode {
                return Err(CronError::InvalidSyntax(format!(
                    "range {piece:?} has start greater than end"
                )));
            }
            (s, e)
        } else {
            let v = Self::resolve_atom(kind, range_part)?;
            if v < min || v > max {
                return Err(CronError::OutOfRange(format!(
                    "value {v} out of range [{min}, {max}]"
                )));
            }
            match step {
                // bare "<v>" with no step: singleton.
                None => {
                    allowed.insert(Self::normalize(kind, v));
                    return Ok(());
                }
                // bare "<v>/<step>": expands up to the field's upper limit.
                Some(_) => (v, max),
            }
        };

        let step = step.unwrap_or(1);
        if start > end {
            // Loop (wrap-around) mode: wrap through the field modulus.
            let modulus = max - min + 1;
            let span = (end + modulus - start) % modulus;
            let steps_count = span / step + 1;
            let mut v = start;
            for _ in 0..steps_count {
                allowed.insert(Self::normalize(kind, v));
                v = min + ((v - min + step) % modulus);
            }
        } else {
            let mut v = start;
            while v <= end {
                allowed.insert(Self::normalize(kind, v));
                v = match v.checked_add(step) {
                    Some(next) => next,
                    None => break,
                };
            }
        }
        Ok(())
    }

    fn normalize(kind: FieldKind, v: u32) -> u32 {
        if kind == FieldKind::Weekday && v == 7 {
            0
        } else {
            v
        }
    }

    /// Does `v` (the candidate value for this column) satisfy this
    /// matcher, given the full candidate instant `dt` for context?
    pub fn matches(&self, v: u32, dt: NaiveDateTime) -> bool {
        let base = self.any || self.allowed.contains(&v);
        match self.kind {
            FieldKind::Day if self.day_last => base || v == last_day_of_month(dt.year(), dt.month()),
            FieldKind::Weekday if !self.weekday_last.is_empty() => {
                base
                    || (is_last_week_of_month(dt)
                        && self.weekday_last.iter().any(|(s, e)| (*s..=*e).contains(&v)))
            }
            _ => base,
        }
    }
}

/// The last calendar day (28-31) of `(year, month)`.
pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .expect("month is always 1..=12, year is bounded by caller");
    first_of_next.pred_opt().expect("never underflows").day()
}

/// True when `dt` falls in the last week of its month that contains its
/// weekday — equivalently, `dt` and `dt + 7 days` land in different months.
fn is_last_week_of_month(dt: NaiveDateTime) -> bool {
    let week_later = dt.date() + chrono::Duration::days(7);
    week_later.month() != dt.month()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_accepts_everything() {
        let m = FieldMatcher::parse(FieldKind::Minute, "*", false).unwrap();
        assert!(m.any);
        for v in 0..=59 {
            assert!(m.matches(v, base_dt()));
        }
    }

    #[test]
    fn question_mark_only_in_day_and_weekday() {
        assert!(FieldMatcher::parse(FieldKind::Day, "?", false).is_ok());
        assert!(FieldMatcher::parse(FieldKind::Weekday, "?", false).is_ok());
        assert!(matches!(
            FieldMatcher::parse(FieldKind::Minute, "?", false),
            Err(CronError::QuestionMarkNotAllowed)
        ));
    }

    #[test]
    fn step_expands_truncated_at_upper_limit() {
        let m = FieldMatcher::parse(FieldKind::Month, "*/3", false).unwrap();
        assert_eq!(m.allowed, BTreeSet::from([1, 4, 7, 10]));
    }

    #[test]
    fn bare_value_with_step_uses_field_upper_limit() {
        let m = FieldMatcher::parse(FieldKind::Second, "50/15", false).unwrap();
        assert_eq!(m.allowed, BTreeSet::from([50]));
    }

    #[test]
    fn range_with_swapped_endpoints_errors_outside_loop_mode() {
        assert!(FieldMatcher::parse(FieldKind::Hour, "20-5", false).is_err());
        assert!(FieldMatcher::parse(FieldKind::Hour, "20-5", true).is_ok());
    }

    #[test]
    fn weekday_alias_range_wraps_through_sunday() {
        let m = FieldMatcher::parse(FieldKind::Weekday, "sat-sun", false).unwrap();
        assert_eq!(m.allowed, BTreeSet::from([0, 6]));
    }

    #[test]
    fn bare_l_only_allowed_in_day() {
        assert!(FieldMatcher::parse(FieldKind::Day, "l", false).is_ok());
        assert!(matches!(
            FieldMatcher::parse(FieldKind::Month, "l", false),
            Err(CronError::LastDayNotAllowed)
        ));
    }

    #[test]
    fn ordinal_weekday_requires_weekday_column() {
        assert!(FieldMatcher::parse(FieldKind::Weekday, "l3-5", false).is_ok());
        assert!(matches!(
            FieldMatcher::parse(FieldKind::Day, "l3", false),
            Err(CronError::OrdinalWeekdayNotAllowed)
        ));
    }

    #[test]
    fn wrap_mode_seconds_example_from_separate_pieces() {
        // "55-5,1/15" as two independent comma-separated pieces: a wrapping
        // range with implicit step 1, and a bare value/step expansion.
        let m = FieldMatcher::parse(FieldKind::Second, "55-5,1/15", true).unwrap();
        let expected: BTreeSet<u32> = [0, 1, 2, 3, 4, 5, 16, 31, 46, 55, 56, 57, 58, 59]
            .into_iter()
            .collect();
        assert_eq!(m.allowed, expected);
    }

    fn base_dt() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }
}
