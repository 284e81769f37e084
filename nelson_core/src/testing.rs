//! *Available using 'unit_test' crate feature only.*</br></br>
//! Vivifiers for use in testing code built on the [`Injector`](crate::Injector).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use crate::injector::{Error, View};
use crate::model::{TypeKey, Value};
use crate::prelude::Vivifier;

type Produce = Box<dyn Fn(&TypeKey) -> Result<Value, Error> + Send + Sync>;

struct Shared {
    produce: Produce,
    calls: AtomicUsize,
    requested: Mutex<Vec<TypeKey>>,
}

/// A vivifier which records each request made of it.
///
/// Clones share their records, so a clone may be registered while the original is inspected.
///
/// ### Example
/// ```
/// # use nelson_core as nelson;
/// use nelson::testing::CountingVivifier;
/// use nelson::{Injector, TypeKey, Value};
///
/// let vivifier = CountingVivifier::returning(Value::new(42u32));
/// let mut injector = Injector::new();
/// injector
///     .add_vivifier(TypeKey::of::<u32>(), Some(Box::new(vivifier.clone())))
///     .unwrap();
///
/// injector.resolve::<u32>().unwrap();
/// injector.resolve::<u32>().unwrap();
/// assert_eq!(vivifier.calls(), 1);
/// ```
#[derive(Clone)]
pub struct CountingVivifier {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for CountingVivifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountingVivifier")
            .field("calls", &self.calls())
            .finish_non_exhaustive()
    }
}

impl CountingVivifier {
    fn new(produce: Produce) -> Self {
        Self {
            shared: Arc::new(Shared {
                produce,
                calls: AtomicUsize::new(0),
                requested: Mutex::new(Vec::default()),
            }),
        }
    }

    /// A vivifier which always produces (a shared clone of) `value`.
    pub fn returning(value: Value) -> Self {
        Self::new(Box::new(move |_| Ok(value.clone())))
    }

    /// A vivifier which always fails with the error built by `error`.
    pub fn failing<F>(error: F) -> Self
    where
        F: Fn() -> Error + Send + Sync + 'static,
    {
        Self::new(Box::new(move |_| Err(error())))
    }

    /// The number of times this vivifier has been invoked.
    pub fn calls(&self) -> usize {
        self.shared.calls.load(Ordering::SeqCst)
    }

    /// The requested types, in the order they were requested.
    pub fn requested(&self) -> Vec<TypeKey> {
        self.shared
            .requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Vivifier for CountingVivifier {
    fn vivify(&self, _view: &View<'_>, ty: &TypeKey) -> Result<Value, Error> {
        self.shared.calls.fetch_add(1, Ordering::SeqCst);
        self.shared
            .requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(*ty);
        (self.shared.produce)(ty)
    }
}

/// The error raised by a [`FailingVivifier`].
#[derive(Debug, Error, PartialEq, Eq)]
#[error("failed to vivify type {0}")]
pub struct VivifyFailure(pub String);

/// A vivifier which always fails with a [`VivifyFailure`] naming the requested type.
///
/// ### Example
/// ```
/// # use nelson_core as nelson;
/// use nelson::testing::{FailingVivifier, VivifyFailure};
/// use nelson::Injector;
///
/// let mut injector = Injector::new();
/// injector.set_fallback(Some(Box::new(FailingVivifier))).unwrap();
///
/// let error = injector.resolve::<u32>().unwrap_err();
/// assert_eq!(error.downcast_ref::<VivifyFailure>(), Some(&VivifyFailure("u32".to_string())));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingVivifier;

impl Vivifier for FailingVivifier {
    fn vivify(&self, _view: &View<'_>, ty: &TypeKey) -> Result<Value, Error> {
        Err(Error::raised(VivifyFailure(ty.to_string())))
    }
}
