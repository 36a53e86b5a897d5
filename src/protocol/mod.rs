//! The text wire protocol.
//!
//! Framing is newline-delimited: one request per line, one response per
//! line. Tokenization is whitespace splitting — there is no quoting or
//! length-prefixing, so a value containing whitespace will tokenize into
//! multiple arguments. This is a deliberate limitation of the protocol, not
//! an oversight.

pub mod connection;

pub use connection::{dispatch_line, handle_connection, ConnectionError, ConnectionStats};
