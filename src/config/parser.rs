//! Generic TOML configuration file loading.

use anyhow::{Context, Result};
use std::path::Path;

/// Read and deserialize a TOML file.
///
/// Errors carry the path of the file that failed to read or parse.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}
