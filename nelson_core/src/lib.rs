//! Core module for `nelson`.
//! See the `nelson` crate documentation root for full details.
#![deny(missing_docs)]
pub mod command;
mod injector;
pub mod interval;
mod model;
pub mod parser;
pub mod prelude;
#[cfg(any(test, feature = "unit_test"))]
pub mod testing;

pub use injector::*;
pub use model::*;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
