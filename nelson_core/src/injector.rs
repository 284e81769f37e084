mod deps;
mod error;
mod invoke;
mod registry;

pub use deps::Deps;
pub use error::{BoxError, Error};
pub use invoke::{Handler, Method, Outcome, Output, Signature};
pub use registry::{Injector, View};
