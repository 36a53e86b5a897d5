//! Command dispatch.
//!
//! A [`Registry`] maps an uppercase command name to a handler. The same
//! registry backs the TCP front-end, the REPL, and the script engine, so a
//! command behaves identically no matter where it was issued from.
//!
//! Handlers are plain function pointers over `(&Store, &[String])` — there is
//! no per-connection state, so a closure or trait object would only add
//! indirection for nothing gained.

pub mod handlers;
pub mod registry;
pub mod script_handlers;

pub use registry::{build_registry, CommandError, CommandFn, Registry};
