//! File operations.
//!
//! Everything duecite persists (collector snapshots, cached BibTeX records)
//! goes through [`atomic_write`], so an interrupted process never leaves a
//! half-written file for the next run to choke on.

pub mod atomic;
pub mod dirs;

pub use atomic::{atomic_write, safe_write};
pub use dirs::{ensure_dir, ensure_parent_dir};
