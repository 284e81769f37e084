use thiserror::Error;

use crate::injector::{BoxError, Error};

/// An error along with how the process should exit because of it.
///
/// ### Example
/// ```
/// # use nelson_core as nelson;
/// use nelson::command::{exit_control, CommandError};
///
/// let error = CommandError::new("no such file", 2).with_usage();
/// assert_eq!(error.to_string(), "no such file");
/// assert_eq!(exit_control(&error), (2, true));
/// ```
#[derive(Debug, Error)]
#[error("{source}")]
pub struct CommandError {
    source: BoxError,
    code: i32,
    usage: bool,
}

impl CommandError {
    /// Wrap `source`, to exit with `code`.
    pub fn new(source: impl Into<BoxError>, code: i32) -> Self {
        Self {
            source: source.into(),
            code,
            usage: false,
        }
    }

    /// Ask for a usage message to be emitted as well.
    pub fn with_usage(mut self) -> Self {
        self.usage = true;
        self
    }

    /// The process exit code.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Whether to emit a usage message.
    pub fn usage(&self) -> bool {
        self.usage
    }
}

impl From<CommandError> for Error {
    fn from(error: CommandError) -> Self {
        Error::raised(error)
    }
}

/// The process exit code, and whether to emit a usage message, for `error`.
///
/// Walks the `source()` chain for a [`CommandError`] (including through errors raised within the [`Injector`](crate::Injector)).
/// Otherwise, defaults to `(1, false)`.
pub fn exit_control(error: &(dyn std::error::Error + 'static)) -> (i32, bool) {
    let mut current = Some(error);

    while let Some(error) = current {
        if let Some(command_error) = find(error) {
            return (command_error.code, command_error.usage);
        }

        current = error.source();
    }

    (1, false)
}

// A raised injector error is transparent, so its source skips over the raised error itself.
fn find<'e>(error: &'e (dyn std::error::Error + 'static)) -> Option<&'e CommandError> {
    error.downcast_ref::<CommandError>().or_else(|| {
        error
            .downcast_ref::<Error>()
            .and_then(|error| error.downcast_ref::<CommandError>())
    })
}
