//! Traits which, typically, may be imported without concern: `use nelson::prelude::*`.

use crate::injector::{Error, Method, View};
use crate::model::{TypeKey, Value};

/// Behaviour to lazily construct a value for a requested type.
///
/// A vivifier receives a read-only [`View`] of the injector it belongs to.
/// Once it returns, the injector caches the produced value; a vivifier is never consulted again for a cached type.
/// An `Err` is handed back to the caller of [`Injector::get`](crate::Injector::get) unchanged.
///
/// Closures of the shape `Fn(&View<'_>, &TypeKey) -> Result<Value, Error>` are vivifiers.
// Needs to be imported in order to implement a custom `Vivifier`.
pub trait Vivifier: Send + Sync {
    /// Construct a value for `ty`.
    fn vivify(&self, view: &View<'_>, ty: &TypeKey) -> Result<Value, Error>;
}

impl<F> Vivifier for F
where
    F: Fn(&View<'_>, &TypeKey) -> Result<Value, Error> + Send + Sync,
{
    fn vivify(&self, view: &View<'_>, ty: &TypeKey) -> Result<Value, Error> {
        self(view, ty)
    }
}

/// Behaviour of a capability set (a trait object, ex: `dyn Greeter`) that values may be registered under.
///
/// Implement via [`capability!`](crate::capability).
pub trait Capability: 'static {
    /// Coerce a value holding one of the implementing concrete types into a value holding `Arc<Self>`.
    /// Returns `None` when the value does not implement this capability set.
    fn coerce(value: &Value) -> Option<Value>;
}

/// Behaviour to look up a method by name on an owning value.
///
/// Implement by hand, or via the `#[receiver]` attribute (see the `derive` module of `nelson`).
// Needs to be imported in order to implement a custom `Receiver`.
pub trait Receiver {
    /// The invocable method `name`, bound to this receiver.
    fn method(&mut self, name: &str) -> Option<Method<'_>>;

    /// The names of the invocable methods, in declaration order.
    fn method_names(&self) -> Vec<&'static str>;
}

/// Declare a capability set and the concrete types which implement it.
///
/// The trait must be `Send + Sync` (typically via supertraits).
///
/// ### Example
/// ```
/// # use nelson_core as nelson;
/// use nelson::{capability, Injector, TypeKey, Value};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
///
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".to_string()
///     }
/// }
///
/// capability!(Greeter = [English]);
///
/// let mut injector = Injector::new();
/// injector
///     .add_interface(TypeKey::interface::<dyn Greeter>(), Value::new(English))
///     .unwrap();
/// let greeter: Arc<dyn Greeter> = injector.resolve().unwrap();
/// assert_eq!(greeter.greet(), "hello");
/// ```
#[macro_export]
macro_rules! capability {
    ($capability:path = [$($concrete:ty),* $(,)?]) => {
        impl $crate::prelude::Capability for dyn $capability {
            #[allow(unused_variables)]
            fn coerce(value: &$crate::Value) -> ::std::option::Option<$crate::Value> {
                $(
                    if let ::std::option::Option::Some(concrete) = value.downcast_arc::<$concrete>() {
                        let shared: ::std::sync::Arc<dyn $capability> = concrete;
                        return ::std::option::Option::Some($crate::Value::from_interface(shared));
                    }

                    if let ::std::option::Option::Some(concrete) = value.downcast_ref::<::std::sync::Arc<$concrete>>() {
                        let shared: ::std::sync::Arc<dyn $capability> = concrete.clone();
                        return ::std::option::Option::Some($crate::Value::from_interface(shared));
                    }
                )*

                ::std::option::Option::None
            }
        }
    };
}
