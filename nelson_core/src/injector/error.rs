use thiserror::Error;

/// An arbitrary error, as raised by a vivifier or an invoked method.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The errors of the [`Injector`](crate::Injector).
///
/// Every variant but [`Error::Raised`] originates from the injector itself (see [`Error::is_injector_error`]).
/// Errors raised by vivifiers and invoked methods are passed through untouched.
#[derive(Debug, Error)]
pub enum Error {
    /// A registration was given an absent value or vivifier.
    #[error("cannot inject nil")]
    NilValue,

    /// A value or vivifier is already registered for the type.
    #[error("type {0}: object of type already available")]
    DuplicateType(String),

    /// The type named for `add_interface` is not a capability set.
    #[error("bad interface type {0}")]
    BadInterface(String),

    /// The value cannot be assigned to the type it is registered under.
    #[error("{value} cannot be assigned to type {ty}")]
    BadType {
        /// The type of the offending value.
        value: String,
        /// The type the value was registered under.
        ty: String,
    },

    /// The method does not exist, or there is no owner to look it up on.
    #[error("no such method {0:?}")]
    NoSuchMethod(String),

    /// The method's signature cannot be injected.
    #[error("{0:?}: method signature cannot be injected")]
    BadMethod(String),

    /// No value, vivifier, or fallback exists for the type.
    #[error("injector missing value for type {0}")]
    MissingValue(String),

    /// An error raised by a vivifier or an invoked method.
    #[error(transparent)]
    Raised(BoxError),
}

impl Error {
    /// Wrap an error raised outside of the injector.
    ///
    /// ### Example
    /// ```
    /// # use nelson_core as nelson;
    /// use nelson::Error;
    ///
    /// let error = Error::raised("disk on fire");
    /// assert!(!error.is_injector_error());
    /// assert_eq!(error.to_string(), "disk on fire");
    /// ```
    pub fn raised(error: impl Into<BoxError>) -> Self {
        Error::Raised(error.into())
    }

    /// Whether this error originates from the injector, as opposed to a vivifier or invoked method.
    pub fn is_injector_error(&self) -> bool {
        !matches!(self, Error::Raised(_))
    }

    /// Borrow the raised error as an `E`.
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Error::Raised(error) => error.downcast_ref::<E>(),
            _ => None,
        }
    }
}
