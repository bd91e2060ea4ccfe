// Construction and evaluation errors. Exhaustion (no matching instant in the
// supported calendar window) is *not* an error — see `walker::walk`, which
// returns `Option<NaiveDateTime>` instead.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CronError {
    /// The schedule string was empty.
    EmptyPattern,
    /// Wrong number of whitespace-separated fields (must be 5, 6, or 7).
    InvalidFieldCount(usize),
    /// A column contained a character not legal for that column.
    IllegalCharacters(String),
    /// A numeric literal, alias, or step fell outside the column's range.
    OutOfRange(String),
    /// A range, step, or ordinal-weekday entry was syntactically malformed.
    InvalidSyntax(String),
    /// `?` used outside the day or weekday column.
    QuestionMarkNotAllowed,
    /// Bare `l` used outside the day column.
    LastDayNotAllowed,
    /// `l<day>` used outside the weekday column.
    OrdinalWeekdayNotAllowed,
    /// A civil date/time manipulation produced a value chrono could not represent.
    InvalidTime,
    /// The walker's final verification pass found a field that did not
    /// actually match after the search loop claimed convergence. Indicates
    /// a bug in this crate, not a bad schedule.
    Internal(String),
}

impl std::fmt::Display for CronError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPattern => write!(f, "schedule string cannot be empty"),
            Self::InvalidFieldCount(n) => {
                write!(f, "schedule must have 5, 6, or 7 fields, found {n}")
            }
            Self::IllegalCharacters(msg) => write!(f, "illegal characters: {msg}"),
            Self::OutOfRange(msg) => write!(f, "value out of range: {msg}"),
            Self::InvalidSyntax(msg) => write!(f, "invalid syntax: {msg}"),
            Self::QuestionMarkNotAllowed => {
                write!(f, "'?' is only allowed in the day and weekday fields")
            }
            Self::LastDayNotAllowed => write!(f, "bare 'l' is only allowed in the day field"),
            Self::OrdinalWeekdayNotAllowed => {
                write!(f, "'l<day>' is only allowed in the weekday field")
            }
            Self::InvalidTime => write!(f, "date/time manipulation produced an invalid instant"),
            Self::Internal(msg) => {
                write!(f, "internal cronwalk error, please file a bug report: {msg}")
            }
        }
    }
}

impl std::error::Error for CronError {}
