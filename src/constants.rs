//! Global constants used throughout the duecite codebase.
//!
//! This module contains environment variable names, default file locations,
//! retry parameters and report defaults shared across modules.

use std::time::Duration;

/// Environment variable that switches citation collection on or off.
///
/// Understood values are `0`, `1`, `yes`, `no`, `true` and `false`.
pub const ENV_ENABLE: &str = "DUECITE_ENABLE";

/// Environment variable that disables the never-fail policy.
///
/// When set to any non-empty value other than `0`, errors that would
/// otherwise be logged and absorbed are raised so tests can observe them.
pub const ENV_ALLOW_FAIL: &str = "DUECITE_ALLOW_FAIL";

/// Comma-separated list of outputs produced when the collector is dumped.
pub const ENV_OUTPUTS: &str = "DUECITE_OUTPUTS";

/// Comma-separated tag allow-list applied to reports (`*` keeps everything).
pub const ENV_REPORT_TAGS: &str = "DUECITE_REPORT_TAGS";

/// Whether reports include packages that were imported but never cited.
pub const ENV_REPORT_ALL: &str = "DUECITE_REPORT_ALL";

/// Bibliography style used by the text report.
pub const ENV_STYLE: &str = "DUECITE_STYLE";

/// Location of the collector snapshot file.
pub const ENV_FILE: &str = "DUECITE_FILE";

/// Directory holding cached BibTeX records fetched for DOIs.
pub const ENV_CACHE_DIR: &str = "DUECITE_CACHE_DIR";

/// Path to an alternative global configuration file.
pub const ENV_CONFIG: &str = "DUECITE_CONFIG";

/// Default snapshot file name, relative to the working directory.
pub const DEFAULT_SNAPSHOT_FILE: &str = ".duecite.json";

/// Default outputs produced on dump.
pub const DEFAULT_OUTPUTS: &str = "stdout,json";

/// Default tag allow-list for reports.
pub const DEFAULT_REPORT_TAGS: &str = "reference-implementation,implementation,dataset";

/// Default bibliography style.
pub const DEFAULT_STYLE: &str = "harvard1";

/// Sentinel used in call conditions to match an argument that was not supplied.
pub const DC_DEFAULT: &str = "DC_DEFAULT";

/// Current version of the on-disk snapshot format.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Base URL for resolving DOIs into BibTeX.
pub const DOI_RESOLVER_URL: &str = "https://doi.org";

/// Number of attempts made when fetching a DOI record.
pub const DOI_FETCH_ATTEMPTS: usize = 10;

/// Initial delay between DOI fetch attempts, in milliseconds.
pub const STARTING_BACKOFF_DELAY_MS: u64 = 100;

/// Upper bound on the delay between DOI fetch attempts, in milliseconds.
pub const MAX_BACKOFF_DELAY_MS: u64 = 500;

/// Timeout for a single DOI request.
pub const DOI_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Log filter used by the binary when neither `RUST_LOG` nor a verbosity
/// flag is given.
pub const DEFAULT_LOG_LEVEL: &str = "warn";
