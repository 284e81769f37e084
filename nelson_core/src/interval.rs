//! Integer intervals, written in interval notation (ex: `[1,7)`).
use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

mod parse;

pub use parse::parse;

/// A half-open interval of integers: `start` is included, `end` is excluded.
///
/// ### Example
/// ```
/// # use nelson_core as nelson;
/// use nelson::interval::Interval;
///
/// let interval: Interval = "(1,7]".parse().unwrap();
/// assert_eq!(interval, Interval { start: 2, end: 8 });
/// assert_eq!(interval.to_string(), "[2,8)");
/// assert!(interval.includes(7));
/// assert!(!interval.includes(8));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    /// The first value in the interval (inclusive).
    pub start: i64,
    /// The value after the last in the interval (exclusive).
    pub end: i64,
}

impl Interval {
    /// Whether `value` falls within this interval.
    pub fn includes(&self, value: i64) -> bool {
        value >= self.start && value < self.end
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.end <= self.start.saturating_add(1) {
            write!(f, "[{}]", self.start)
        } else {
            write!(f, "[{},{})", self.start, self.end)
        }
    }
}

impl FromStr for Interval {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// The error for text which is not valid interval notation.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid interval {text:?}")]
pub struct IntervalError {
    text: String,
    #[source]
    cause: Option<ParseIntError>,
}

impl IntervalError {
    pub(crate) fn new(text: &str, cause: Option<ParseIntError>) -> Self {
        Self {
            text: text.to_string(),
            cause,
        }
    }

    /// The offending text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The integer parse failure, when that is what made the text invalid.
    pub fn cause(&self) -> Option<&ParseIntError> {
        self.cause.as_ref()
    }
}
