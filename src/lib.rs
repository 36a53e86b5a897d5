//! # furrdb — a small, in-memory key-value database
//!
//! furrdb is a single-node, in-memory key-value store with typed values
//! (strings, lists, sets), per-key TTL expiry, durable snapshotting, a
//! newline-delimited text protocol, and an embedded scripting DSL.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │                                furrdb                                 │
//! │                                                                       │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────────────────┐    │
//! │  │ TCP Server  │───>│ Connection  │───>│    Command Registry      │    │
//! │  │ (Listener)  │    │  Handler    │    │   (name -> handler fn)   │    │
//! │  └─────────────┘    └─────────────┘    └─────────────┬───────────┘    │
//! │                           ▲                          │                │
//! │                           │                          ▼                │
//! │                     ┌─────┴──────┐          ┌─────────────────┐       │
//! │                     │    REPL    │          │      Store       │       │
//! │                     └────────────┘          │  RwLock<values,   │       │
//! │                                              │       expiries>  │       │
//! │                     ┌────────────┐          └─────────┬────────┘       │
//! │                     │   Script   │────────────────────┘                │
//! │                     │   Engine   │                    ▲                │
//! │                     └────────────┘                    │                │
//! │                                              ┌─────────┴─────────┐     │
//! │                                              │      Reaper       │     │
//! │                                              │ (background task) │     │
//! │                                              └────────────────────┘    │
//! │                                                        ▲               │
//! │                                              ┌─────────┴─────────┐     │
//! │                                              │    Snapshotter     │     │
//! │                                              └────────────────────┘    │
//! └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use furrdb::store::{Store, start_reaper};
//! use furrdb::commands::build_registry;
//! use furrdb::protocol::{handle_connection, ConnectionStats};
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(Store::new());
//!     let _reaper = start_reaper(Arc::clone(&store));
//!     let registry = Arc::new(build_registry());
//!     let stats = Arc::new(ConnectionStats::new());
//!
//!     let listener = TcpListener::bind("localhost:7070").await.unwrap();
//!     loop {
//!         let (stream, addr) = listener.accept().await.unwrap();
//!         tokio::spawn(handle_connection(
//!             stream,
//!             addr,
//!             Arc::clone(&store),
//!             Arc::clone(&registry),
//!             Arc::clone(&stats),
//!         ));
//!     }
//! }
//! ```
//!
//! ## Supported Commands
//!
//! ### Keys & strings
//! - `SET key value`, `GET key`, `DEL key`, `EXISTS key`, `KEYS`
//! - `EXPIRE key seconds`, `TTL key`
//!
//! ### Lists
//! - `LPUSH key value...`, `RPUSH key value...`, `LPOP key`, `RPOP key`
//! - `LRANGE key start end`
//!
//! ### Sets
//! - `SADD key value...`, `SREM key value...`, `SMEMBERS key`
//!
//! ### Server
//! - `INFO`, `FLUSHDB`, `SNAPSHOT [path]`
//!
//! ### Scripting
//! - `REGSCRIPT script`, `RUNSCRIPT hash [args...]`, `EVAL script`
//!
//! ## Module Overview
//!
//! - [`store`]: the typed key space, TTL index, and background reaper
//! - [`commands`]: the command registry and every handler
//! - [`script`]: the embedded scripting DSL
//! - [`snapshot`]: save/load of the key space to a single file
//! - [`protocol`]: the newline-delimited text wire protocol
//!
//! ## Design Highlights
//!
//! ### One lock, not many
//!
//! Unlike a sharded design, the store's values, kinds, and expiries sit
//! behind a single `RwLock`, because the TTL and kind invariants only hold if
//! all three are read and written as one unit.
//!
//! ### Lazy + active expiry
//!
//! Keys with a TTL are reclaimed two ways: lazily, when `GET`/`EXISTS`/`TTL`
//! touch an elapsed key; and actively, by a background reaper that sweeps the
//! whole key space once a second.

pub mod commands;
pub mod protocol;
pub mod script;
pub mod snapshot;
pub mod store;

// Re-export commonly used types for convenience
pub use commands::{build_registry, CommandError, Registry};
pub use protocol::{handle_connection, ConnectionStats};
pub use store::{start_reaper, Reaper, Store, Value};

/// The host furrdb binds to by default.
pub const DEFAULT_HOST: &str = "localhost";

/// The port furrdb listens on by default.
pub const DEFAULT_PORT: u16 = 7070;

/// The default snapshot file path.
pub const DEFAULT_SNAPSHOT_PATH: &str = snapshot::DEFAULT_SNAPSHOT_PATH;

/// furrdb's version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
