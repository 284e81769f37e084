use std::num::ParseIntError;

use crate::interval::{Interval, IntervalError};
use crate::parser::{self, State};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    // Expecting the opener.
    Init,
    Start,
    // Expecting the separator, or the closer.
    Separator,
    End,
    Close,
    Done,
}

#[derive(Debug)]
struct IntervalState<'t> {
    text: &'t str,
    interval: Interval,
    empty_start: bool,
    exclusive_start: bool,
    exclusive_end: bool,
    // Byte offset where the current integer begins.
    integer_pos: usize,
    phase: Phase,
}

impl<'t> IntervalState<'t> {
    fn new(text: &'t str) -> Self {
        Self {
            text,
            interval: Interval { start: 0, end: 0 },
            empty_start: false,
            exclusive_start: false,
            exclusive_end: false,
            integer_pos: 0,
            phase: Phase::Init,
        }
    }

    fn error(&self) -> IntervalError {
        IntervalError::new(self.text, None)
    }

    fn integer_error(&self, cause: ParseIntError) -> IntervalError {
        IntervalError::new(self.text, Some(cause))
    }

    // Extract the integer which ends at `pos`.
    fn integer(&mut self, pos: usize) -> Result<i64, ParseIntError> {
        if self.integer_pos == pos {
            if self.phase == Phase::Start {
                self.empty_start = true;
                self.exclusive_start = false;
                return Ok(i64::MIN);
            }

            self.exclusive_end = true;
            return Ok(i64::MAX);
        }

        self.text[self.integer_pos..pos].parse::<i64>()
    }

    fn finish(mut self) -> Result<Interval, IntervalError> {
        if self.phase != Phase::Done {
            return Err(self.error());
        }

        if self.exclusive_start {
            self.interval.start = self.interval.start.checked_add(1).ok_or_else(|| self.error())?;
        }

        if !self.exclusive_end {
            self.interval.end = self.interval.end.checked_add(1).ok_or_else(|| self.error())?;
        }

        if self.interval.end <= self.interval.start {
            return Err(self.error());
        }

        Ok(self.interval)
    }
}

impl<'t> State for IntervalState<'t> {
    type Error = IntervalError;

    fn parse(&mut self, pos: usize, ch: char) -> Result<(), Self::Error> {
        match self.phase {
            Phase::Init => {
                match ch {
                    '(' => self.exclusive_start = true,
                    '[' => {}
                    _ => return Err(self.error()),
                }

                self.phase = Phase::Start;
                self.integer_pos = pos + 1;
            }
            Phase::Start | Phase::End => {
                let sign = self.integer_pos == pos && (ch == '+' || ch == '-');

                if !ch.is_ascii_digit() && !sign {
                    let value = self.integer(pos).map_err(|e| self.integer_error(e))?;

                    if self.phase == Phase::Start {
                        self.interval.start = value;
                        self.phase = Phase::Separator;
                    } else {
                        self.interval.end = value;
                        self.phase = Phase::Close;
                    }

                    return self.parse(pos, ch);
                }
            }
            Phase::Separator => match ch {
                ',' => {
                    self.phase = Phase::End;
                    self.integer_pos = pos + 1;
                }
                ')' | ']' => {
                    // A lone value (or nothing at all) covers just that value (or everything).
                    if self.empty_start {
                        self.interval.end = i64::MAX;
                    } else {
                        self.exclusive_start = false;
                        self.interval.end = self
                            .interval
                            .start
                            .checked_add(1)
                            .ok_or_else(|| self.error())?;
                    }

                    self.exclusive_end = true;
                    self.phase = Phase::Close;
                    return self.parse(pos, ch);
                }
                _ => return Err(self.error()),
            },
            Phase::Close => {
                match ch {
                    ')' => self.exclusive_end = true,
                    ']' => {}
                    _ => return Err(self.error()),
                }

                self.phase = Phase::Done;
            }
            Phase::Done => return Err(self.error()),
        }

        Ok(())
    }
}

/// Parse interval notation into a normalized (half-open) [`Interval`].
///
/// The notation is an opener, an optional start, an optional separator and end, and a closer.
/// `[`/`]` include the adjacent value, while `(`/`)` exclude it.
/// * An empty start is unbounded (`i64::MIN`), and an empty end is unbounded (`i64::MAX`, exclusive).
/// * A lone value covers just that value, regardless of the brackets: `(5)` is `[5,6)`.
/// * `[]` and `()` cover everything.
///
/// ### Example
/// ```
/// # use nelson_core as nelson;
/// use nelson::interval::{parse, Interval};
///
/// assert_eq!(parse("[1,7]").unwrap(), Interval { start: 1, end: 8 });
/// assert_eq!(parse("(,7)").unwrap(), Interval { start: i64::MIN, end: 7 });
/// assert!(parse("[7,1]").is_err());
/// ```
pub fn parse(text: &str) -> Result<Interval, IntervalError> {
    let mut state = IntervalState::new(text);

    if text.len() < 2 {
        return Err(state.error());
    }

    parser::parse(text, &mut state)?;
    state.finish()
}
