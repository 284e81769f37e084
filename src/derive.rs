//! Derive Api for `nelson` receivers.
//!
//! ### Getting Started
//! Instrument an inherent `impl` block with `#[receiver]`.
//! This generates an implementation of [`Receiver`](crate::prelude::Receiver), so that each method may be invoked by name
//! via [`Injector::call`](crate::Injector::call), with its parameters resolved by the injector.
//!
//! ```ignore
//! #[receiver]
//! impl Server {
//!     fn serve(&mut self, config: Config, port: u16) -> Result<(), CommandError> {
//!         ..
//!     }
//!
//!     // The above generates (roughly):
//!     //  "serve" => Some(Handler::into_method(move |arg0: Config, arg1: u16| Server::serve(&mut *self, arg0, arg1), "serve"))
//! }
//! ```
//!
//! ### Method Configuration
//! The generated implementation uses the following rules:
//! * Methods taking `&self` or `&mut self` are invocable, in declaration order (see [`Receiver::method_names`](crate::prelude::Receiver::method_names)).
//! * Associated functions (no `self`) are left out.
//! * Methods instrumented with `#[receiver(skip)]` are left out.
//! * Each parameter receives a clone of the injected value, so parameters must be owned types which are `Clone + Send + Sync + 'static`.
//! Share values via `Arc<T>`.
//! * Methods must return either nothing, or `Result<(), E>` where `E: Into<nelson::Error>`
//! (ex: [`CommandError`](crate::command::CommandError)).
//!
//! The following are rejected at compile time:
//! * A `#[receiver]` on a trait impl block.
//! * Methods taking `self` by value (or via an explicit type, ex: `self: Box<Self>`).
//! * Reference, `impl Trait`, or pattern parameters.
//! * Generic or `async` methods.
//!
//! The generated code refers to `::nelson`, so the crate must be a direct dependency.
pub use nelson_derive::receiver;
