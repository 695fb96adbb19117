//! Integration test suite for duecite
//!
//! End-to-end tests of citation injection, persistence and the command-line
//! tool.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **injection_flow**: lazy registration, member wrapping, load order
//! - **lifecycle**: the switch, dumping and restoring snapshots
//! - **collector_scenarios**: citing by key, loading `.bib` files
//! - **cli**: the `duecite` binary via `assert_cmd`

mod cli;
mod collector_scenarios;
mod injection_flow;
mod lifecycle;
