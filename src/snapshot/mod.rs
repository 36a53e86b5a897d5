//! Snapshot persistence.
//!
//! A snapshot is a single `serde_json`-encoded file holding the store's
//! values (with their intrinsic kind tags) and expiries. Save copies the
//! state out under a shared lock and releases it before encoding and
//! writing — the store is never held locked across file I/O. Load replaces
//! both maps wholesale under an exclusive lock.

use crate::store::{Store, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_SNAPSHOT_PATH: &str = "dump.rdb";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    values: HashMap<String, Value>,
    expiries: HashMap<String, i64>,
}

/// Writes `store`'s full state to `path`.
pub fn save(store: &Store, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
    let (values, expiries) = store.export();
    let file = SnapshotFile { values, expiries };
    let encoded = serde_json::to_vec(&file)?;

    let path = path.as_ref();
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, encoded)?;
    fs::rename(&tmp_path, path)?;

    info!(path = %path.display(), keys = file.values.len(), "snapshot saved");
    Ok(())
}

/// Loads `path` into `store`, replacing its state wholesale. If the file does
/// not exist, this is a no-op (a fresh server has nothing to restore).
pub fn load(store: &Store, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(());
    }
    let raw = fs::read(path)?;
    let file: SnapshotFile = serde_json::from_slice(&raw)?;
    let key_count = file.values.len();
    store.import(file.values, file.expiries);
    info!(path = %path.display(), keys = key_count, "snapshot loaded");
    Ok(())
}
