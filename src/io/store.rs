//! Collector snapshots on disk.
//!
//! A snapshot is a JSON document holding the collector's tables:
//!
//! ```json
//! {
//!   "version": 1,
//!   "entries": [{"kind": "bibtex", "raw": "@article{...}", "key": "xxx0"}],
//!   "citations": [{"entry": {...}, "path": "pkg:func", "tags": ["implementation"], "count": 3}]
//! }
//! ```
//!
//! Snapshots are written atomically. A snapshot written by a newer format
//! version is refused rather than half understood.

use crate::citation::Citation;
use crate::collector::Collector;
use crate::constants::SNAPSHOT_FORMAT_VERSION;
use crate::core::DueError;
use crate::entries::Entry;
use crate::utils::fs::atomic_write;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    entries: Vec<&'a Entry>,
    citations: Vec<&'a Citation>,
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    #[serde(default)]
    entries: Vec<Entry>,
    #[serde(default)]
    citations: Vec<Citation>,
}

/// Write `collector` to `path`, replacing any previous snapshot.
pub fn save_collector(collector: &Collector, path: &Path) -> Result<()> {
    let snapshot = SnapshotRef {
        version: SNAPSHOT_FORMAT_VERSION,
        entries: collector.entries().values().collect(),
        citations: collector.citations().values().collect(),
    };

    let content = serde_json::to_string_pretty(&snapshot).context("Failed to serialize collector")?;
    atomic_write(path, content.as_bytes())
        .with_context(|| format!("Failed to save collector to {}", path.display()))?;

    debug!("Saved {} to {}", collector, path.display());
    Ok(())
}

/// Read a collector back from `path`.
pub fn load_collector(path: &Path) -> Result<Collector, DueError> {
    let content = std::fs::read_to_string(path)?;

    let snapshot: Snapshot = serde_json::from_str(&content).map_err(|e| DueError::SnapshotParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;

    if snapshot.version > SNAPSHOT_FORMAT_VERSION {
        return Err(DueError::SnapshotParse {
            file: path.display().to_string(),
            reason: format!(
                "format version {} is newer than the supported version {}",
                snapshot.version, SNAPSHOT_FORMAT_VERSION
            ),
        });
    }

    let collector = Collector::from_parts(snapshot.entries, snapshot.citations);
    debug!("Loaded {} from {}", collector, path.display());
    Ok(collector)
}
