//! Configuration for citation collection and reporting.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. built-in defaults;
//! 2. the config file, `~/.duecite/config.toml` or the path in
//!    `DUECITE_CONFIG`;
//! 3. `DUECITE_*` environment variables.
//!
//! # Config file
//!
//! ```toml
//! enable = true
//! outputs = ["stdout", "json"]
//! report_tags = ["implementation", "edu"]
//! report_all = false
//! style = "harvard1"
//! filename = ".duecite.json"
//! cache_dir = "/home/user/.cache/duecite/bibtex"
//! ```
//!
//! # Environment
//!
//! | Variable               | Field         | Format                      |
//! |------------------------|---------------|-----------------------------|
//! | `DUECITE_ENABLE`       | `enable`      | `1`/`yes`/`true` or `0`/`no`/`false` |
//! | `DUECITE_OUTPUTS`      | `outputs`     | comma separated             |
//! | `DUECITE_REPORT_TAGS`  | `report_tags` | comma separated, `*` for all |
//! | `DUECITE_REPORT_ALL`   | `report_all`  | boolean                     |
//! | `DUECITE_STYLE`        | `style`       | style name                  |
//! | `DUECITE_FILE`         | `filename`    | path                        |
//! | `DUECITE_CACHE_DIR`    | `cache_dir`   | path                        |
//!
//! [`DueConfig::load_with`] takes the variable lookup as a function, so
//! callers and tests can supply values without touching the process
//! environment.

pub mod parser;

pub use parser::parse_config;

use crate::constants::{
    DEFAULT_OUTPUTS, DEFAULT_REPORT_TAGS, DEFAULT_SNAPSHOT_FILE, DEFAULT_STYLE, ENV_CACHE_DIR,
    ENV_CONFIG, ENV_ENABLE, ENV_FILE, ENV_OUTPUTS, ENV_REPORT_ALL, ENV_REPORT_TAGS, ENV_STYLE,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Resolved settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DueConfig {
    /// Collect citations for this process
    pub enable: bool,
    /// Outputs written by a dump: `stdout`, `stderr`, `json`
    pub outputs: Vec<String>,
    /// Citations carrying any of these tags are reported; `*` reports all
    pub report_tags: Vec<String>,
    /// Keep package citations that nothing inside them was cited for
    pub report_all: bool,
    /// Bibliography style for text reports
    pub style: String,
    /// Collector snapshot file
    pub filename: PathBuf,
    /// Directory of cached BibTeX records fetched for DOIs
    pub cache_dir: PathBuf,
}

impl Default for DueConfig {
    fn default() -> Self {
        Self {
            enable: false,
            outputs: split_list(DEFAULT_OUTPUTS),
            report_tags: split_list(DEFAULT_REPORT_TAGS),
            report_all: false,
            style: DEFAULT_STYLE.to_string(),
            filename: PathBuf::from(DEFAULT_SNAPSHOT_FILE),
            cache_dir: Self::default_cache_dir(),
        }
    }
}

impl DueConfig {
    /// Load settings from the config file and the process environment.
    pub fn load() -> Result<Self> {
        Self::load_with(|name| std::env::var(name).ok())
    }

    /// Load settings, reading variables through `lookup`.
    ///
    /// A missing config file is not an error; an unreadable or invalid one
    /// is.
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let path = match lookup(ENV_CONFIG) {
            Some(path) => PathBuf::from(path),
            None => Self::default_path()?,
        };

        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env(lookup);
        Ok(config)
    }

    /// Load settings from a TOML file, without environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: Self = parse_config(path)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// `~/.duecite/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Unable to determine home directory")?;
        Ok(home.join(".duecite").join("config.toml"))
    }

    /// `<user cache dir>/duecite/bibtex`, or a relative fallback.
    pub fn default_cache_dir() -> PathBuf {
        dirs::cache_dir()
            .map(|dir| dir.join("duecite"))
            .unwrap_or_else(|| PathBuf::from(".duecite-cache"))
            .join("bibtex")
    }

    /// Override fields from `DUECITE_*` variables found through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup(ENV_ENABLE) {
            self.enable = parse_flag(ENV_ENABLE, &value);
        }
        if let Some(value) = lookup(ENV_OUTPUTS) {
            self.outputs = split_list(&value).into_iter().map(|o| o.to_lowercase()).collect();
        }
        if let Some(value) = lookup(ENV_REPORT_TAGS) {
            let tags = split_list(&value);
            if !tags.is_empty() {
                self.report_tags = tags;
            }
        }
        if let Some(value) = lookup(ENV_REPORT_ALL) {
            self.report_all = parse_flag(ENV_REPORT_ALL, &value);
        }
        if let Some(value) = lookup(ENV_STYLE).filter(|v| !v.trim().is_empty()) {
            self.style = value.trim().to_string();
        }
        if let Some(value) = lookup(ENV_FILE).filter(|v| !v.trim().is_empty()) {
            self.filename = PathBuf::from(value.trim());
        }
        if let Some(value) = lookup(ENV_CACHE_DIR).filter(|v| !v.trim().is_empty()) {
            self.cache_dir = PathBuf::from(value.trim());
        }
    }
}

/// Interpret a boolean variable.
///
/// `1`, `yes`, `true` and `on` are true. Anything else is false, with a
/// warning for values that are not a recognised false spelling either.
pub fn parse_flag(name: &str, value: &str) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => true,
        "" | "0" | "no" | "false" | "off" => false,
        other => {
            warn!("Misunderstood value {} for {}. Use 'yes' or 'no', or '0' or '1'", other, name);
            false
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty()).map(str::to_string).collect()
}
