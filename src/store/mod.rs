//! The Store
//!
//! This module provides the core in-memory key space: a single reader-writer
//! lock guarding every key's value, its kind, and its expiry together.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                    Store                       │
//! │     RwLock<Inner{ values, expiries }>          │
//! └───────────────────────────────────────────────┘
//!                        ▲
//!                        │
//!           ┌────────────┴────────────┐
//!           │         Reaper          │
//!           │ (background Tokio task) │
//!           └─────────────────────────┘
//! ```
//!
//! Unlike a sharded design, every key lives behind the same lock. The store's
//! invariants (a key's kind, value, and expiry agreeing with one another) only
//! hold if all three are read and written as one unit, so there is exactly one
//! `RwLock` here rather than many.
//!
//! ## Expiry
//!
//! `GET`, `EXISTS`, `TTL`, and `EXPIRE` perform lazy eviction: if a key's
//! expiry has elapsed, it is removed before the read/write proceeds. Keys that
//! are never touched again are swept up by the background [`reaper`].

pub mod engine;
pub mod reaper;

pub use engine::{Store, Value};
pub use reaper::{start_reaper, Reaper};
