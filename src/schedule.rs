//! The parsed, immutable seven-field schedule and its membership query.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Timelike};

use crate::errors::CronError;
use crate::matcher::{FieldKind, FieldMatcher};

/// `@nickname` expansions, checked before the field count is validated.
/// Seconds are omitted; the standard five fields follow cron's own table.
const ALIASES: [(&str, &str); 8] = [
    ("@yearly", "0 0 1 1 *"),
    ("@annually", "0 0 1 1 *"),
    ("@monthly", "0 0 1 * *"),
    ("@weekly", "0 0 * * 0"),
    ("@daily", "0 0 * * *"),
    ("@midnight", "0 0 * * *"),
    ("@hourly", "0 * * * *"),
    ("@minutely", "* * * * *"),
];

/// A fully parsed schedule: one [`FieldMatcher`] per column, in
/// second/minute/hour/day/month/weekday/year order.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub second: FieldMatcher,
    pub minute: FieldMatcher,
    pub hour: FieldMatcher,
    pub day: FieldMatcher,
    pub month: FieldMatcher,
    pub weekday: FieldMatcher,
    pub year: FieldMatcher,
    /// True when the seconds column was omitted from the source string
    /// and therefore defaults to `*` rather than an explicit literal —
    /// affects equality (two schedules differing only by an
    /// implicit vs. explicit "every second" are equal).
    random_seconds: bool,
    normalized: String,
}

impl Schedule {
    /// Parses a fixed-mode schedule: no wrap-around ranges, no
    /// random-second column. Most callers want this; callers that need
    /// the extra knobs use [`crate::parser::ScheduleParser`].
    pub fn new(pattern: &str) -> Result<Self, CronError> {
        crate::parser::ScheduleParser::new().parse(pattern)
    }

    pub(crate) fn from_fields(
        columns: &[&str],
        loop_mode: bool,
        second_loop_mode: bool,
        random_seconds: bool,
    ) -> Result<Self, CronError> {
        if columns.len() != 7 {
            return Err(CronError::Internal(format!(
                "from_fields expects 7 columns, got {}",
                columns.len()
            )));
        }
        let second = FieldMatcher::parse(FieldKind::Second, columns[0], second_loop_mode)?;
        let minute = FieldMatcher::parse(FieldKind::Minute, columns[1], loop_mode)?;
        let hour = FieldMatcher::parse(FieldKind::Hour, columns[2], loop_mode)?;
        let day = FieldMatcher::parse(FieldKind::Day, columns[3], loop_mode)?;
        let month = FieldMatcher::parse(FieldKind::Month, columns[4], loop_mode)?;
        let weekday = FieldMatcher::parse(FieldKind::Weekday, columns[5], loop_mode)?;
        let year = FieldMatcher::parse(FieldKind::Year, columns[6], loop_mode)?;

        let normalized = columns.join(" ");
        Ok(Self {
            second,
            minute,
            hour,
            day,
            month,
            weekday,
            year,
            random_seconds,
            normalized,
        })
    }

    /// Expands a `@nickname`, if `pattern` is one; otherwise returns it
    /// unchanged.
    pub(crate) fn expand_alias(pattern: &str) -> Option<&'static str> {
        ALIASES
            .iter()
            .find(|(name, _)| *name == pattern)
            .map(|(_, expansion)| *expansion)
    }

    /// The membership predicate: every column's matcher must accept the
    /// corresponding field of `dt` — when both day-of-month and weekday
    /// are restricted, both must independently accept it.
    pub fn matches<Tz: TimeZone>(&self, dt: &DateTime<Tz>) -> bool {
        let naive = dt.naive_local();
        self.matches_naive(naive)
    }

    pub(crate) fn matches_naive(&self, dt: NaiveDateTime) -> bool {
        if !self.second.matches(dt.second(), dt) {
            return false;
        }
        if !self.minute.matches(dt.minute(), dt) {
            return false;
        }
        if !self.hour.matches(dt.hour(), dt) {
            return false;
        }
        if !self.month.matches(dt.month(), dt) {
            return false;
        }
        if !self.year.matches(dt.year() as u32, dt) {
            return false;
        }

        let day_restricted = !self.day.any;
        let weekday_restricted = !self.weekday.any;
        let weekday_num = dt.weekday().num_days_from_sunday();

        match (day_restricted, weekday_restricted) {
            (false, false) => true,
            (true, false) => self.day.matches(dt.day(), dt),
            (false, true) => self.weekday.matches(weekday_num, dt),
            // Both restricted: the seven-field grammar treats day-of-month
            // and weekday as independent requirements — a candidate must
            // satisfy both.
            (true, true) => self.day.matches(dt.day(), dt) && self.weekday.matches(weekday_num, dt),
        }
    }

    pub fn second(&self) -> &FieldMatcher {
        &self.second
    }
    pub fn minute(&self) -> &FieldMatcher {
        &self.minute
    }
    pub fn hour(&self) -> &FieldMatcher {
        &self.hour
    }
    pub fn day(&self) -> &FieldMatcher {
        &self.day
    }
    pub fn month(&self) -> &FieldMatcher {
        &self.month
    }
    pub fn weekday(&self) -> &FieldMatcher {
        &self.weekday
    }
    pub fn year(&self) -> &FieldMatcher {
        &self.year
    }

    pub fn has_random_seconds(&self) -> bool {
        self.random_seconds
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.normalized)
    }
}

impl FromStr for Schedule {
    type Err = CronError;

    fn from_str(s: &str) -> Result<Self, CronError> {
        Schedule::new(s)
    }
}

/// Equality skips the seconds column whenever either side was built in
/// random-second mode — that mode picks one arbitrary second rather than
/// expressing anything about *which* second matters, so two schedules
/// that agree on every other column are the same schedule.
impl PartialEq for Schedule {
    fn eq(&self, other: &Self) -> bool {
        if !(self.random_seconds || other.random_seconds) && self.second != other.second {
            return false;
        }
        self.minute == other.minute
            && self.hour == other.hour
            && self.day == other.day
            && self.month == other.month
            && self.weekday == other.weekday
            && self.year == other.year
    }
}

impl Eq for Schedule {}

impl std::hash::Hash for Schedule {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Must not depend on `second`: a non-random schedule can compare
        // equal to a random-second one regardless of either side's second
        // field (see `PartialEq`), so including it here could produce two
        // equal schedules with different hashes.
        self.minute.hash(state);
        self.hour.hash(state);
        self.day.hash(state);
        self.month.hash(state);
        self.weekday.hash(state);
        self.year.hash(state);
    }
}

impl PartialOrd for Schedule {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Schedule {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (&self.minute, &self.hour, &self.day, &self.month, &self.weekday, &self.year).cmp(&(
            &other.minute,
            &other.hour,
            &other.day,
            &other.month,
            &other.weekday,
            &other.year,
        ))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Schedule {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.normalized)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Schedule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Schedule::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    #[cfg(feature = "serde")]
    use serde_test::{assert_de_tokens_error, assert_tokens, Token};

    #[test]
    fn alias_expands_before_field_split() {
        assert_eq!(Schedule::expand_alias("@daily"), Some("0 0 * * *"));
        assert_eq!(Schedule::expand_alias("0 0 * * *"), None);
    }

    #[test]
    fn day_weekday_both_restricted_requires_both() {
        // Only a 13th that is also a Friday matches; an ordinary Friday or
        // an ordinary 13th alone does not.
        let s = Schedule::new("0 0 0 13 * fri *").unwrap();
        let friday_13th = Utc.with_ymd_and_hms(2023, 1, 13, 0, 0, 0).unwrap();
        let other_friday = Utc.with_ymd_and_hms(2023, 1, 20, 0, 0, 0).unwrap();
        let thirteenth_wednesday = Utc.with_ymd_and_hms(2023, 9, 13, 0, 0, 0).unwrap();
        assert!(s.matches(&friday_13th));
        assert!(!s.matches(&other_friday));
        assert!(!s.matches(&thirteenth_wednesday));
    }

    #[test]
    fn display_round_trips_normalized_form() {
        let s = Schedule::new("0 0 12 * * * *").unwrap();
        assert_eq!(s.to_string(), "0 0 12 * * * *");
    }

    #[rstest]
    // Nicknames
    #[case("@hourly", "@daily", false)]
    #[case("@daily", "@weekly", false)]
    #[case("@annually", "@yearly", true)]
    // seven-field equivalents of the same instant
    #[case("0 0 0 * * * *", "@daily", true)]
    #[case("0 0 12 * * * *", "0 30 12 * * * *", false)]
    // field specificity
    #[case("0 5 * * * * *", "0 10 * * * * *", false)]
    #[case("0 * * * JAN * *", "0 * * * JUL * *", false)]
    #[case("0 * * * * 0 *", "0 * * * * 3 *", false)]
    #[case("0 * * * * SUN *", "0 * * * * WED *", false)]
    // ranges and steps normalize to the same allowed set
    #[case("0 0-29 * * * * *", "0 30-59 * * * * *", false)]
    #[case("0 */15 * * * * *", "0 */30 * * * * *", false)]
    // wildcards
    #[case("? ? ? ? ? ? ?", "* * * * * * *", true)]
    fn equality_matches_whether_two_patterns_describe_the_same_schedule(
        #[case] left: &str,
        #[case] right: &str,
        #[case] expect_equal: bool,
    ) {
        let a = Schedule::new(left).unwrap();
        let b = Schedule::new(right).unwrap();
        assert_eq!(a == b, expect_equal, "{left:?} vs {right:?}");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_its_normalized_pattern_string() {
        let schedule = Schedule::new("0 0 * * * * *").unwrap();
        assert_tokens(&schedule, &[Token::Str("0 0 * * * * *")]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializing_an_invalid_pattern_reports_the_parse_error() {
        assert_de_tokens_error::<Schedule>(
            &[Token::Str("not a schedule")],
            "schedule must have 5, 6, or 7 fields, found 3",
        );
    }
}
