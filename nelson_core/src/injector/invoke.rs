use std::any::Any;
use std::collections::HashSet;

use crate::injector::{Deps, Error, Injector};
use crate::model::{TypeKey, Value};
use crate::prelude::Receiver;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The shape of a value returned by an invocable method.
#[derive(Debug, Clone, Copy)]
pub enum Output {
    /// An error-shaped result.
    Error,
    /// Any other value.
    Value(TypeKey),
}

/// The runtime description of an invocable method.
///
/// Only methods which take zero or more distinctly typed parameters, are not variadic,
/// and return either nothing or an error-shaped result may be invoked (see [`Signature::validate`]).
///
/// ### Example
/// ```
/// # use nelson_core as nelson;
/// use nelson::{Output, Signature, TypeKey};
///
/// let signature = Signature::new("run")
///     .param(TypeKey::of::<u32>())
///     .output(Output::Error);
/// assert!(signature.validate().is_ok());
///
/// let signature = Signature::new("run").variadic();
/// assert!(signature.validate().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Signature {
    name: String,
    parameters: Vec<TypeKey>,
    variadic: bool,
    outputs: Vec<Output>,
}

impl Signature {
    /// Describe the method `name`, taking no parameters and returning nothing.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::default(),
            variadic: false,
            outputs: Vec::default(),
        }
    }

    /// Append a parameter.
    pub fn param(mut self, ty: TypeKey) -> Self {
        self.parameters.push(ty);
        self
    }

    /// Append multiple parameters.
    pub fn params(mut self, tys: impl IntoIterator<Item = TypeKey>) -> Self {
        self.parameters.extend(tys);
        self
    }

    /// Mark the final parameter as variadic.
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Append an output.
    pub fn output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    /// Append multiple outputs.
    pub fn outputs(mut self, outputs: impl IntoIterator<Item = Output>) -> Self {
        self.outputs.extend(outputs);
        self
    }

    /// The method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parameter types, in declaration order.
    pub fn parameters(&self) -> &[TypeKey] {
        &self.parameters
    }

    /// Whether the method is variadic.
    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    /// The outputs, in declaration order.
    pub fn results(&self) -> &[Output] {
        &self.outputs
    }

    /// Check the method may be invoked by the injector.
    ///
    /// Fails with `BadMethod` when the method:
    /// * is variadic,
    /// * returns more than one value,
    /// * returns a single value which is not error-shaped, or
    /// * takes two parameters of the same type (the injector holds only one value per type).
    pub fn validate(&self) -> Result<(), Error> {
        let bad_outputs = !matches!(self.outputs.as_slice(), [] | [Output::Error]);

        if self.variadic || bad_outputs {
            return Err(Error::BadMethod(self.name.clone()));
        }

        let mut seen = HashSet::with_capacity(self.parameters.len());

        for ty in &self.parameters {
            if !seen.insert(ty) {
                return Err(Error::BadMethod(self.name.clone()));
            }
        }

        Ok(())
    }
}

type Body<'a> = Box<dyn FnMut(Vec<Value>) -> Result<(), Error> + 'a>;

/// An invocable method: its [`Signature`] along with the body to call.
///
/// The body receives one `Value` per parameter, in declaration order.
/// Typically built from a function or closure via [`Handler`].
pub struct Method<'a> {
    signature: Signature,
    body: Body<'a>,
}

impl<'a> std::fmt::Debug for Method<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Method")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

impl<'a> Method<'a> {
    /// Create a method from its description and body.
    pub fn new(
        signature: Signature,
        body: impl FnMut(Vec<Value>) -> Result<(), Error> + 'a,
    ) -> Self {
        Self {
            signature,
            body: Box::new(body),
        }
    }

    /// Create a method from a function or closure.
    ///
    /// ### Example
    /// ```
    /// # use nelson_core as nelson;
    /// use nelson::{Method, TypeKey};
    ///
    /// let method = Method::from_handler("double", |value: u32| println!("{}", value * 2));
    /// assert_eq!(method.name(), "double");
    /// assert_eq!(method.signature().parameters(), &[TypeKey::of::<u32>()]);
    /// ```
    pub fn from_handler<Args, H: Handler<'a, Args>>(name: impl Into<String>, handler: H) -> Self {
        handler.into_method(name)
    }

    /// The method name.
    pub fn name(&self) -> &str {
        self.signature.name()
    }

    /// The method description.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The dependencies of this method: one empty entry per parameter type.
    ///
    /// Fails with `BadMethod` if the method cannot be invoked.
    pub fn deps(&self) -> Result<Deps, Error> {
        self.signature.validate()?;
        Ok(Deps::from_keys(self.signature.parameters().iter().copied()))
    }

    /// Invoke the method with pre-assembled inputs, without consulting an injector.
    ///
    /// Fails with `BadMethod` if the method cannot be invoked, or `MissingValue` if an input is absent.
    /// The method is invoked only once every input is present.
    pub fn call_with(&mut self, inputs: &Deps) -> Result<(), Error> {
        self.signature.validate()?;
        let values = self
            .signature
            .parameters()
            .iter()
            .map(|ty| {
                inputs
                    .get(ty)
                    .cloned()
                    .ok_or_else(|| Error::MissingValue(ty.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        (self.body)(values)
    }

    fn invoke(&mut self, values: Vec<Value>) -> Result<(), Error> {
        (self.body)(values)
    }
}

/// Behaviour of a value-returning callable which the injector may surface as the invocation result.
pub trait Outcome {
    /// The outputs to describe in the [`Signature`].
    fn outputs() -> Vec<Output>;

    /// Convert into the invocation result.
    fn into_result(self) -> Result<(), Error>;
}

impl Outcome for () {
    fn outputs() -> Vec<Output> {
        Vec::default()
    }

    fn into_result(self) -> Result<(), Error> {
        Ok(())
    }
}

impl<E: Into<Error>> Outcome for Result<(), E> {
    fn outputs() -> Vec<Output> {
        vec![Output::Error]
    }

    fn into_result(self) -> Result<(), Error> {
        self.map_err(Into::into)
    }
}

/// Behaviour to turn a function or closure into an invocable [`Method`].
///
/// Implemented for `FnMut(P1, .., Pn) -> R` for up to 8 parameters,
/// where each parameter is `Clone + Send + Sync + 'static` and `R` is an [`Outcome`].
/// Parameters receive clones of the injected values.
pub trait Handler<'a, Args> {
    /// Describe and wrap this callable as the method `name`.
    fn into_method(self, name: impl Into<String>) -> Method<'a>;
}

// Take the next injected value as a `T`.
fn take<T: Clone + Any>(values: &mut impl Iterator<Item = Value>) -> Result<T, Error> {
    let ty = TypeKey::of::<T>();
    let value = values
        .next()
        .ok_or_else(|| Error::MissingValue(ty.to_string()))?;

    value
        .downcast_ref::<T>()
        .cloned()
        .ok_or_else(|| Error::BadType {
            value: value.type_key().to_string(),
            ty: ty.to_string(),
        })
}

macro_rules! impl_handler {
    ($($param:ident),*) => {
        impl<'a, F, R, $($param,)*> Handler<'a, ($($param,)*)> for F
        where
            F: FnMut($($param),*) -> R + 'a,
            R: Outcome,
            $($param: Clone + Any + Send + Sync,)*
        {
            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn into_method(mut self, name: impl Into<String>) -> Method<'a> {
                let signature = Signature::new(name)
                    .params(vec![$(TypeKey::of::<$param>()),*])
                    .outputs(R::outputs());

                Method::new(signature, move |values: Vec<Value>| {
                    let mut values = values.into_iter();
                    $(
                        let $param = take::<$param>(&mut values)?;
                    )*
                    self($($param),*).into_result()
                })
            }
        }
    };
}

impl_handler!();
impl_handler!(P1);
impl_handler!(P1, P2);
impl_handler!(P1, P2, P3);
impl_handler!(P1, P2, P3, P4);
impl_handler!(P1, P2, P3, P4, P5);
impl_handler!(P1, P2, P3, P4, P5, P6);
impl_handler!(P1, P2, P3, P4, P5, P6, P7);
impl_handler!(P1, P2, P3, P4, P5, P6, P7, P8);

impl Injector {
    /// Invoke the method `name` of `owner`, injecting its parameters.
    ///
    /// Fails with `NoSuchMethod` if there is no owner, or the owner has no such method.
    /// Otherwise, behaves as [`Injector::call_method`].
    pub fn call(&mut self, owner: Option<&mut dyn Receiver>, name: &str) -> Result<(), Error> {
        let owner = owner.ok_or_else(|| Error::NoSuchMethod(name.to_string()))?;
        let mut method = owner
            .method(name)
            .ok_or_else(|| Error::NoSuchMethod(name.to_string()))?;

        self.call_method(&mut method)
    }

    /// Invoke the method, injecting its parameters.
    ///
    /// 1. The signature is validated (`BadMethod`, see [`Signature::validate`]).
    /// 2. Each parameter is resolved via [`Injector::get`], in declaration order.
    /// The first failure is returned as is; the remaining parameters are not resolved, and the method is not invoked.
    /// 3. The method is invoked, and its error (if any) is returned as is.
    pub fn call_method(&mut self, method: &mut Method<'_>) -> Result<(), Error> {
        method.signature().validate()?;
        let mut values = Vec::with_capacity(method.signature().parameters().len());

        for ty in method.signature().parameters() {
            values.push(self.get(ty)?);
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Invoking method '{}'.", method.name());
        }

        method.invoke(values)
    }

    /// Invoke a function or closure, injecting its parameters.
    ///
    /// ### Example
    /// ```
    /// # use nelson_core as nelson;
    /// use nelson::{Error, Injector};
    ///
    /// let mut injector = Injector::new();
    /// injector.provide(2u32).unwrap();
    ///
    /// let mut total = 0;
    /// injector.invoke(|value: u32| total += value).unwrap();
    /// assert_eq!(total, 2);
    ///
    /// let error = injector
    ///     .invoke(|_: u32| -> Result<(), Error> { Err(Error::raised("bad value")) })
    ///     .unwrap_err();
    /// assert_eq!(error.to_string(), "bad value");
    /// ```
    pub fn invoke<'a, Args, H: Handler<'a, Args>>(&mut self, handler: H) -> Result<(), Error> {
        let mut method = handler.into_method(std::any::type_name::<H>());
        self.call_method(&mut method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CountingVivifier;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use thiserror::Error;

    #[derive(Debug, Error, PartialEq, Eq)]
    #[error("some error")]
    struct SomeError;

    struct Counter {
        count: u32,
        step: u32,
    }

    impl Receiver for Counter {
        fn method(&mut self, name: &str) -> Option<Method<'_>> {
            match name {
                "increment" => Some(Method::from_handler(name.to_string(), |step: u32| {
                    self.step = step;
                    self.count += step;
                })),
                "reset" => Some(Method::from_handler(name.to_string(), || {
                    self.count = 0;
                    Ok::<(), Error>(())
                })),
                _ => None,
            }
        }

        fn method_names(&self) -> Vec<&'static str> {
            vec!["increment", "reset"]
        }
    }

    #[test]
    fn signature_handler() {
        // Setup
        let method = Method::from_handler("f", |_: u32, _: String| -> Result<(), Error> { Ok(()) });

        // Verify
        assert_eq!(method.name(), "f");
        assert_eq!(
            method.signature().parameters(),
            &[TypeKey::of::<u32>(), TypeKey::of::<String>()]
        );
        assert!(!method.signature().is_variadic());
        assert_matches!(method.signature().results(), [Output::Error]);
    }

    #[test]
    fn signature_handler_no_result() {
        let method = Method::from_handler("f", || {});

        assert!(method.signature().parameters().is_empty());
        assert!(method.signature().results().is_empty());
        assert!(method.signature().validate().is_ok());
    }

    #[rstest]
    #[case(Signature::new("m"))]
    #[case(Signature::new("m").output(Output::Error))]
    #[case(Signature::new("m").param(TypeKey::of::<u32>()).param(TypeKey::of::<u64>()))]
    fn signature_validate(#[case] signature: Signature) {
        assert!(signature.validate().is_ok());
    }

    #[rstest]
    #[case(Signature::new("m").param(TypeKey::of::<u32>()).variadic())]
    #[case(Signature::new("m").output(Output::Error).output(Output::Error))]
    #[case(Signature::new("m").output(Output::Value(TypeKey::of::<u32>())).output(Output::Error))]
    #[case(Signature::new("m").output(Output::Value(TypeKey::of::<u32>())))]
    #[case(Signature::new("m").param(TypeKey::of::<u32>()).param(TypeKey::of::<u32>()))]
    fn signature_validate_bad(#[case] signature: Signature) {
        assert_matches!(signature.validate(), Err(Error::BadMethod(ref name)) if name == "m");
    }

    #[rstest]
    #[case(Signature::new("m").param(TypeKey::of::<u32>()).variadic())]
    #[case(Signature::new("m").param(TypeKey::of::<u32>()).output(Output::Error).output(Output::Error))]
    #[case(Signature::new("m").param(TypeKey::of::<u32>()).output(Output::Value(TypeKey::of::<u8>())))]
    #[case(Signature::new("m").param(TypeKey::of::<u32>()).param(TypeKey::of::<u32>()))]
    fn call_method_bad_signature(#[case] signature: Signature) {
        // Setup
        let mut injector = Injector::new();
        let vivifier = CountingVivifier::returning(Value::new(1u32));
        injector
            .add_vivifier(TypeKey::of::<u32>(), Some(Box::new(vivifier.clone())))
            .unwrap();
        let mut invoked = false;
        let mut method = Method::new(signature, |_| {
            invoked = true;
            Ok(())
        });

        // Execute
        let error = injector.call_method(&mut method).unwrap_err();

        // Verify
        assert_matches!(error, Error::BadMethod(_));
        drop(method);
        assert!(!invoked);
        // Rejected before any resolution.
        assert_eq!(vivifier.calls(), 0);
        assert!(injector.is_empty());
    }

    #[test]
    fn call_method_duplicate_parameters() {
        // Setup
        let mut injector = Injector::new();
        injector.provide(1u32).unwrap();
        let mut method = Method::from_handler("f", |_: u32, _: u32| {});

        // Execute
        let error = injector.call_method(&mut method).unwrap_err();

        // Verify
        assert_matches!(error, Error::BadMethod(ref name) if name == "f");
    }

    #[test]
    fn call_method_end_to_end() {
        // Setup
        let mut injector = Injector::new();
        injector.add(Value::new("hello".to_string())).unwrap();
        let vivifier = CountingVivifier::returning(Value::new(42i32));
        injector
            .add_vivifier(TypeKey::of::<i32>(), Some(Box::new(vivifier.clone())))
            .unwrap();
        let mut observed = None;
        let mut method = Method::from_handler("f", |i: i32, s: String| {
            observed = Some((i, s));
        });

        // Execute
        injector.call_method(&mut method).unwrap();

        // Verify
        drop(method);
        assert_eq!(observed, Some((42, "hello".to_string())));
        assert_eq!(injector.resolve::<i32>().unwrap(), 42);
        assert_eq!(vivifier.calls(), 1);
    }

    #[test]
    fn call_method_error_passthrough() {
        // Setup
        let mut injector = Injector::new();
        let vivifier = CountingVivifier::failing(|| Error::raised(SomeError));
        injector
            .add_vivifier(TypeKey::of::<i32>(), Some(Box::new(vivifier.clone())))
            .unwrap();
        let mut invoked = false;
        let mut method = Method::from_handler("f", |_: i32| invoked = true);

        // Execute
        let error = injector.call_method(&mut method).unwrap_err();

        // Verify
        assert_eq!(error.downcast_ref::<SomeError>(), Some(&SomeError));
        let error = injector.get(&TypeKey::of::<i32>()).unwrap_err();
        assert_eq!(error.downcast_ref::<SomeError>(), Some(&SomeError));
        assert_eq!(vivifier.calls(), 2);
        drop(method);
        assert!(!invoked);
    }

    #[test]
    fn call_method_all_or_nothing() {
        // Setup
        let mut injector = Injector::new();
        let first = CountingVivifier::returning(Value::new(1u8));
        let third = CountingVivifier::returning(Value::new(3u32));
        injector
            .add_vivifier(TypeKey::of::<u8>(), Some(Box::new(first.clone())))
            .unwrap();
        injector
            .add_vivifier(TypeKey::of::<u32>(), Some(Box::new(third.clone())))
            .unwrap();
        let mut invoked = false;
        let mut method = Method::from_handler("f", |_: u8, _: u16, _: u32| invoked = true);

        // Execute
        let error = injector.call_method(&mut method).unwrap_err();

        // Verify
        assert_matches!(error, Error::MissingValue(ref name) if name == "u16");
        drop(method);
        assert!(!invoked);
        assert_eq!(first.calls(), 1);
        assert_eq!(third.calls(), 0);
        assert!(!injector.contains(&TypeKey::of::<u32>()));
    }

    #[test]
    fn call_method_callee_error() {
        // Setup
        let mut injector = Injector::new();
        injector.provide(5u32).unwrap();
        let mut method = Method::from_handler("f", |value: u32| -> Result<(), Error> {
            Err(Error::raised(format!("rejected {value}")))
        });

        // Execute
        let error = injector.call_method(&mut method).unwrap_err();

        // Verify
        assert!(!error.is_injector_error());
        assert_eq!(error.to_string(), "rejected 5");
    }

    #[test]
    fn call_method_shared_values() {
        // Setup
        let mut injector = Injector::new();
        let hits = Arc::new(AtomicUsize::new(0));
        injector.provide(hits.clone()).unwrap();

        // Execute
        for _ in 0..3 {
            injector
                .invoke(|hits: Arc<AtomicUsize>| {
                    hits.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
        }

        // Verify
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn call_method_fallback() {
        // Setup
        let mut injector = Injector::new();
        injector
            .fallback_with(|_, ty| {
                if ty == &TypeKey::of::<u64>() {
                    Ok(Value::new(64u64))
                } else {
                    Err(Error::MissingValue(ty.to_string()))
                }
            })
            .unwrap();
        let mut observed = 0;

        // Execute
        injector.invoke(|value: u64| observed = value).unwrap();
        let error = injector.invoke(|_: u8| {}).unwrap_err();

        // Verify
        assert_eq!(observed, 64);
        assert_matches!(error, Error::MissingValue(ref name) if name == "u8");
        assert_eq!(injector.len(), 1);
    }

    #[test]
    fn call() {
        // Setup
        let mut injector = Injector::new();
        injector.provide(3u32).unwrap();
        let mut counter = Counter { count: 1, step: 0 };

        // Execute
        injector.call(Some(&mut counter), "increment").unwrap();
        injector.call(Some(&mut counter), "increment").unwrap();

        // Verify
        assert_eq!(counter.count, 7);
        assert_eq!(counter.step, 3);

        // Execute
        injector.call(Some(&mut counter), "reset").unwrap();

        // Verify
        assert_eq!(counter.count, 0);
    }

    #[test]
    fn call_no_owner() {
        let mut injector = Injector::new();

        let error = injector.call(None, "increment").unwrap_err();

        assert_matches!(error, Error::NoSuchMethod(ref name) if name == "increment");
    }

    #[test]
    fn call_no_method() {
        let mut injector = Injector::new();
        let mut counter = Counter { count: 0, step: 0 };

        let error = injector.call(Some(&mut counter), "decrement").unwrap_err();

        assert_matches!(error, Error::NoSuchMethod(ref name) if name == "decrement");
        assert_eq!(error.to_string(), "no such method \"decrement\"");
    }

    #[test]
    fn call_missing_value() {
        let mut injector = Injector::new();
        let mut counter = Counter { count: 0, step: 0 };

        let error = injector.call(Some(&mut counter), "increment").unwrap_err();

        assert_matches!(error, Error::MissingValue(_));
        assert_eq!(counter.count, 0);
    }

    #[test]
    fn call_with() {
        // Setup
        let mut observed = None;
        let mut method = Method::from_handler("f", |i: i32, s: String| {
            observed = Some(format!("{s}{i}"));
        });
        let mut deps = method.deps().unwrap();
        deps.insert(Value::new(1i32));
        deps.insert(Value::new("a".to_string()));

        // Execute
        method.call_with(&deps).unwrap();

        // Verify
        drop(method);
        assert_eq!(observed.as_deref(), Some("a1"));
    }

    #[test]
    fn call_with_missing() {
        // Setup
        let mut invoked = false;
        let mut method = Method::from_handler("f", |_: i32, _: String| invoked = true);
        let mut deps = method.deps().unwrap();
        deps.insert(Value::new(1i32));

        // Execute
        let error = method.call_with(&deps).unwrap_err();

        // Verify
        assert_matches!(error, Error::MissingValue(ref name) if name == "alloc::string::String");
        drop(method);
        assert!(!invoked);
    }

    #[test]
    fn deps_bad_method() {
        let method = Method::from_handler("f", |_: i32, _: i32| {});

        assert_matches!(method.deps(), Err(Error::BadMethod(_)));
    }

    #[test]
    fn method_debug() {
        let method = Method::from_handler("f", || {});

        assert!(format!("{method:?}").starts_with("Method { signature: Signature { name: \"f\""));
    }
}
