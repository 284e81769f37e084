//! `nelson` is a collection of building blocks for command line programs in Rust.
//!
//! At its heart is the [`Injector`]: a type indexed pool of values which invokes functions, closures, and methods
//! by resolving each of their parameters from the pool.
//! Values may be registered up front, or constructed on demand (and then cached) by *vivifiers*.
//! This allows a command line program to construct its process-wide singletons (configuration, clients, etc) lazily,
//! and only when the selected command actually needs them.
//!
//! Alongside the injector, `nelson` provides:
//! * *Command trees*:
//! The [`command`] module describes commands and their sub-commands, with decorators to hide, deprecate, or alias commands.
//! * *Exit control*:
//! [`command::CommandError`] associates an error with the process exit code (and whether to emit a usage message),
//! which [`command::exit_control`] recovers from any error chain.
//! * *Interval notation*:
//! The [`interval`] module parses inputs such as `[1,7)` or `(,10]` into a normalized, half-open [`interval::Interval`].
//! * *Parse driver*:
//! The [`parser`] module feeds text, one character at a time, to a state machine.
//!
//! # Usage
//! This page includes a demo using `nelson`.
//! Methods are made invocable by name via the [derive Api](./derive/index.html).
//! ```no_run
#![doc = include_str!("../demos/greeter.rs")]
//! ```
//!
//! Which runs as follows:
//! ```console
//! $ greeter "[1,2]"
//! greet: Greet the world.
//! Greet the world.
//! 1: Hello, world!
//! 2: Hello, world!
//! Greeted 2 times.
//!
//! $ greeter "[8,20)"
//! greet: Greet the world.
//! Greet the world.
//! cannot greet [8,20) times
//! usage: greeter [INTERVAL]
//! ```
//!
//! # Resolution
//! When a value is requested of the [`Injector`], it is resolved in a fixed order:
//! 1. The cached value for the type, if present.
//! 2. The value constructed by the vivifier for the type, if present.
//! 3. The value constructed by the fallback vivifier, if present.
//!
//! Constructed values are cached, so each vivifier is invoked at most once per type (unless it fails).
//! Invocation is all or nothing: when any parameter cannot be resolved, the target is not invoked.
//!
//! Capability sets (trait objects) are declared via [`capability!`], and registered under
//! [`TypeKey::interface`].
//!
//! # Features
//! * `unit_test`: For features that help with unit testing.
//! * `tracing_debug`: Emit `tracing` debug events for registration, resolution, and invocation.
pub mod derive;
pub use nelson_core::*;
