//! Filesystem helpers shared by the snapshot store, the DOI cache and the CLI.

pub mod fs;
