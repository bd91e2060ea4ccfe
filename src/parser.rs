//! Builds a [`Schedule`] from a schedule string, with the optional knobs
//! this crate exposes as constructor inputs: wrap-around ranges and a
//! randomized seconds column.
//!
//! Uses `derive_builder` to expose a handful of parsing modes over a
//! single `parse` entry point.

use derive_builder::Builder;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::errors::CronError;
use crate::schedule::Schedule;

/// Parses extended cron-style schedule strings into [`Schedule`]s.
///
/// Construct with [`ScheduleParser::new`] for the defaults, or
/// [`ScheduleParser::builder`] to turn on wrap-around ranges or a
/// randomized seconds column.
#[derive(Debug, Clone, Builder)]
#[builder(default, build_fn(skip), pattern = "owned")]
pub struct ScheduleParser {
    /// Allow a range whose start is numerically greater than its end to
    /// wrap through the field's modulus instead of being
    /// rejected as malformed.
    loop_mode: bool,
    /// When the seconds column is omitted (a 5-field pattern), draw it
    /// from a uniform `0..60` distribution instead of the fixed literal
    /// `"0"`.
    random_seconds: bool,
    /// Explicit seed for the `random_seconds` draw, so callers (and
    /// tests) can make the draw reproducible. `None` seeds from system
    /// entropy.
    rng_seed: Option<u64>,
}

impl Default for ScheduleParser {
    fn default() -> Self {
        Self {
            loop_mode: false,
            random_seconds: false,
            rng_seed: None,
        }
    }
}

impl ScheduleParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ScheduleParserBuilder {
        ScheduleParserBuilder::default()
    }

    /// Parses `pattern` into a [`Schedule`] under this parser's settings.
    pub fn parse(&self, pattern: &str) -> Result<Schedule, CronError> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(CronError::EmptyPattern);
        }

        let expanded;
        let body = if let Some(expansion) = Schedule::expand_alias(trimmed) {
            expanded = expansion.to_string();
            expanded.as_str()
        } else {
            trimmed
        };

        let columns: Vec<&str> = body.split_whitespace().collect();
        let second_literal;
        let seven = match columns.len() {
            5 => {
                second_literal = self.random_second_column();
                let mut v = Vec::with_capacity(7);
                v.push(second_literal.as_str());
                v.extend(columns);
                v.push("*");
                v
            }
            6 => {
                // minute hour day month weekday year — the second column
                // is the only one missing, so it is prepended; unlike the
                // 5-field form, year is already present and is not
                // appended.
                second_literal = self.random_second_column();
                let mut v = Vec::with_capacity(7);
                v.push(second_literal.as_str());
                v.extend(columns);
                v
            }
            7 => columns,
            n => return Err(CronError::InvalidFieldCount(n)),
        };

        throw_at_illegal_characters(&seven)?;

        // Wrap-around (loop) mode is always in effect on the second column
        // when random-second injection is requested, independent of this
        // parser's general `loop_mode` setting — the documented way to
        // combine a wrap-style second expression with a random draw.
        let second_loop_mode = self.loop_mode || self.random_seconds;
        Schedule::from_fields(&seven, self.loop_mode, second_loop_mode, self.random_seconds)
    }

    /// The second column used when promoting a 5-field pattern: the fixed
    /// literal `"0"` normally, or a uniformly random `0..60` integer when
    /// `random_seconds` is set, seeded from `rng_seed` if given or system
    /// entropy otherwise.
    fn random_second_column(&self) -> String {
        if !self.random_seconds {
            return "0".to_string();
        }
        let mut rng = match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        rng.gen_range(0..60).to_string()
    }
}

impl ScheduleParserBuilder {
    pub fn build(self) -> ScheduleParser {
        ScheduleParser {
            loop_mode: self.loop_mode.unwrap_or(false),
            random_seconds: self.random_seconds.unwrap_or(false),
            rng_seed: self.rng_seed.unwrap_or(None),
        }
    }
}

/// Rejects characters no column of any schedule ever legitimately uses,
/// before per-column parsing assigns a more specific diagnostic.
fn throw_at_illegal_characters(columns: &[&str]) -> Result<(), CronError> {
    const ALLOWED: &str = "0123456789*,-/?labcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
    for column in columns {
        if let Some(bad) = column.chars().find(|c| !ALLOWED.contains(*c)) {
            return Err(CronError::IllegalCharacters(format!(
                "character {bad:?} not allowed in {column:?}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_field_pattern_promotes_seconds_and_year() {
        let parser = ScheduleParser::new();
        let schedule = parser.parse("0 0 * * *").unwrap();
        assert!(schedule.second().allowed.contains(&0));
        assert!(!schedule.second().any);
        assert!(schedule.year().any);
    }

    #[test]
    fn six_field_pattern_promotes_second_only() {
        // minute hour day month weekday year — second is prepended, year
        // is already the explicit trailing column.
        let parser = ScheduleParser::new();
        let schedule = parser.parse("30 9 1 1 * 2030").unwrap();
        assert!(schedule.second().allowed.contains(&0));
        assert!(!schedule.second().any);
        assert!(!schedule.year().any);
        assert!(schedule.year().allowed.contains(&2030));
    }

    #[test]
    fn nickname_expands_before_splitting() {
        let parser = ScheduleParser::new();
        let schedule = parser.parse("@daily").unwrap();
        assert!(schedule.hour().allowed.contains(&0));
    }

    #[test]
    fn wrong_field_count_is_rejected() {
        let parser = ScheduleParser::new();
        assert!(matches!(
            parser.parse("* * *"),
            Err(CronError::InvalidFieldCount(3))
        ));
    }

    #[test]
    fn empty_pattern_is_rejected() {
        let parser = ScheduleParser::new();
        assert!(matches!(parser.parse("   "), Err(CronError::EmptyPattern)));
    }

    #[test]
    fn loop_mode_must_be_requested_explicitly() {
        assert!(ScheduleParser::new().parse("20-5 * * * * * *").is_err());
        let wrapping = ScheduleParser::builder().loop_mode(true).build();
        assert!(wrapping.parse("20-5 * * * * * *").is_ok());
    }

    #[test]
    fn illegal_character_is_rejected() {
        let parser = ScheduleParser::new();
        assert!(matches!(
            parser.parse("0 0 0 * * $ *"),
            Err(CronError::IllegalCharacters(_))
        ));
    }

    #[test]
    fn random_seconds_draws_a_value_in_range_and_is_not_wildcard() {
        let parser = ScheduleParser::builder()
            .random_seconds(true)
            .rng_seed(Some(7))
            .build();
        let schedule = parser.parse("0 0 * * *").unwrap();
        assert!(!schedule.second().any);
        assert_eq!(schedule.second().allowed.len(), 1);
        let drawn = *schedule.second().allowed.iter().next().unwrap();
        assert!(drawn < 60);
    }

    #[test]
    fn same_seed_draws_the_same_second_every_time() {
        let parser = ScheduleParser::builder()
            .random_seconds(true)
            .rng_seed(Some(42))
            .build();
        let a = parser.parse("0 0 * * *").unwrap();
        let b = parser.parse("0 0 * * *").unwrap();
        assert_eq!(a.second().allowed, b.second().allowed);
    }

    #[test]
    fn random_seconds_enables_wrap_mode_on_the_second_column_only() {
        // The second column accepts a wrapping range even though general
        // `loop_mode` was never requested...
        let parser = ScheduleParser::builder().random_seconds(true).build();
        assert!(parser.parse("55-5 0 0 * * * *").is_ok());
        // ...but every other column still rejects one.
        assert!(parser.parse("0 55-5 0 * * * *").is_err());
    }
}
