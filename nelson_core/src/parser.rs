//! A single pass, character at a time, parse driver.

/// Behaviour of a parser state machine, fed one character at a time by [`parse`].
pub trait State {
    /// The error which aborts the parse.
    type Error;

    /// Process the character `ch` found at byte offset `pos`.
    fn parse(&mut self, pos: usize, ch: char) -> Result<(), Self::Error>;
}

/// Feed each character of `text`, along with its byte offset, to `state`.
/// Stops at (and returns) the first error.
///
/// ### Example
/// ```
/// # use nelson_core as nelson;
/// use nelson::parser::{parse, State};
///
/// #[derive(Default)]
/// struct Digits(Vec<u32>);
///
/// impl State for Digits {
///     type Error = usize;
///
///     fn parse(&mut self, pos: usize, ch: char) -> Result<(), usize> {
///         self.0.push(ch.to_digit(10).ok_or(pos)?);
///         Ok(())
///     }
/// }
///
/// let mut digits = Digits::default();
/// parse("123", &mut digits).unwrap();
/// assert_eq!(digits.0, vec![1, 2, 3]);
/// assert_eq!(parse("4x6", &mut Digits::default()), Err(1));
/// ```
pub fn parse<S: State + ?Sized>(text: &str, state: &mut S) -> Result<(), S::Error> {
    for (pos, ch) in text.char_indices() {
        state.parse(pos, ch)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq, Eq)]
    struct Stop(usize);

    struct Recorder {
        seen: Vec<(usize, char)>,
        stop: Option<usize>,
    }

    impl Recorder {
        fn new(stop: Option<usize>) -> Self {
            Self {
                seen: Vec::default(),
                stop,
            }
        }
    }

    impl State for Recorder {
        type Error = Stop;

        fn parse(&mut self, pos: usize, ch: char) -> Result<(), Stop> {
            self.seen.push((pos, ch));

            match self.stop {
                Some(stop) if stop == pos => Err(Stop(pos)),
                _ => Ok(()),
            }
        }
    }

    #[test]
    fn parse_all() {
        // Setup
        let mut recorder = Recorder::new(None);

        // Execute
        parse("test", &mut recorder).unwrap();

        // Verify
        assert_eq!(recorder.seen, vec![(0, 't'), (1, 'e'), (2, 's'), (3, 't')]);
    }

    #[rstest]
    #[case(0, vec![(0, 't')])]
    #[case(2, vec![(0, 't'), (1, 'e'), (2, 's')])]
    #[case(3, vec![(0, 't'), (1, 'e'), (2, 's'), (3, 't')])]
    fn parse_error(#[case] stop: usize, #[case] expected: Vec<(usize, char)>) {
        // Setup
        let mut recorder = Recorder::new(Some(stop));

        // Execute
        let result = parse("test", &mut recorder);

        // Verify
        assert_eq!(result, Err(Stop(stop)));
        assert_eq!(recorder.seen, expected);
    }

    #[test]
    fn parse_byte_offsets() {
        let mut recorder = Recorder::new(None);

        parse("é[1]", &mut recorder).unwrap();

        assert_eq!(recorder.seen, vec![(0, 'é'), (2, '['), (3, '1'), (4, ']')]);
    }

    #[test]
    fn parse_empty() {
        let mut recorder = Recorder::new(Some(0));

        parse("", &mut recorder).unwrap();

        assert!(recorder.seen.is_empty());
    }
}
