//! Resolving DOIs to BibTeX records.
//!
//! Records are fetched from the DOI resolver with content negotiation
//! (`Accept: application/x-bibtex`) and cached as plain files, one per DOI,
//! so a report can be rendered offline once a DOI has been seen.

use crate::constants::{
    DOI_FETCH_ATTEMPTS, DOI_REQUEST_TIMEOUT, DOI_RESOLVER_URL, MAX_BACKOFF_DELAY_MS,
    STARTING_BACKOFF_DELAY_MS,
};
use crate::entries::{Entry, EntryKind};
use crate::utils::fs::safe_write;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, warn};

/// Directory of BibTeX records keyed by DOI.
#[derive(Debug, Clone)]
pub struct DoiCache {
    dir: PathBuf,
}

impl DoiCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the record for `doi`.
    pub fn path_for(&self, doi: &str) -> PathBuf {
        self.dir.join(normalize_doi(doi).replace(['/', '\\', ':'], "_"))
    }

    /// The cached record for `doi`, if any.
    pub fn get(&self, doi: &str) -> Option<String> {
        let path = self.path_for(doi);
        match std::fs::read_to_string(&path) {
            Ok(bibtex) => Some(bibtex),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read cached record {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn contains(&self, doi: &str) -> bool {
        self.path_for(doi).is_file()
    }

    pub fn store(&self, doi: &str, bibtex: &str) -> Result<()> {
        safe_write(&self.path_for(doi), bibtex)
    }
}

/// Strip resolver prefixes such as `doi:` or `https://doi.org/`.
pub fn normalize_doi(doi: &str) -> &str {
    let doi = doi.trim();
    ["https://doi.org/", "http://doi.org/", "https://dx.doi.org/", "http://dx.doi.org/", "doi:"]
        .iter()
        .find_map(|prefix| doi.strip_prefix(prefix))
        .unwrap_or(doi)
        .trim()
}

/// BibTeX for `doi`, from the cache or the DOI resolver.
///
/// A fetched record is cached before it is returned. Responses that are not
/// BibTeX are retried up to ten times with backoff before giving up.
pub async fn fetch_doi(doi: &str, cache: &DoiCache) -> Result<String> {
    fetch_doi_from(DOI_RESOLVER_URL, doi, cache).await
}

pub(crate) async fn fetch_doi_from(resolver: &str, doi: &str, cache: &DoiCache) -> Result<String> {
    if let Some(cached) = cache.get(doi) {
        debug!("Using cached record for {}", doi);
        return Ok(cached);
    }

    let url = format!("{}/{}", resolver.trim_end_matches('/'), normalize_doi(doi));
    let client = reqwest::Client::builder()
        .timeout(DOI_REQUEST_TIMEOUT)
        .build()
        .context("Failed to create HTTP client")?;

    let strategy = ExponentialBackoff::from_millis(STARTING_BACKOFF_DELAY_MS)
        .max_delay(Duration::from_millis(MAX_BACKOFF_DELAY_MS))
        .take(DOI_FETCH_ATTEMPTS - 1);

    let bibtex = Retry::spawn(strategy, || {
        let client = client.clone();
        let url = url.clone();
        async move {
            debug!("Submitting GET to {}", url);
            let response = client
                .get(&url)
                .header(reqwest::header::ACCEPT, "application/x-bibtex; charset=utf-8")
                .send()
                .await
                .map_err(|e| format!("request failed: {e}"))?;

            let status = response.status();
            let body = response.text().await.map_err(|e| format!("failed to read response: {e}"))?;
            let body = body.trim().to_string();
            if body.starts_with('@') {
                Ok(body)
            } else {
                warn!("Failed to obtain BibTeX from {} (HTTP {}), retrying", url, status);
                Err(format!("response was not BibTeX (HTTP {status})"))
            }
        }
    })
    .await
    .map_err(|e| anyhow::anyhow!("Query {} for BibTeX of DOI {} (wrong DOI?) has failed: {}", url, doi, e))?;

    cache.store(doi, &bibtex)?;
    Ok(bibtex)
}

/// Fetch and cache records for every DOI entry not cached yet.
///
/// Failures are logged and skipped. Returns how many records were fetched.
pub async fn prefetch<'a>(entries: impl IntoIterator<Item = &'a Entry>, cache: &DoiCache) -> usize {
    let mut fetched = 0;
    for entry in entries {
        if entry.kind() != EntryKind::Doi || cache.contains(entry.raw()) {
            continue;
        }
        match fetch_doi(entry.raw(), cache).await {
            Ok(_) => fetched += 1,
            Err(e) => warn!("Failed to fetch BibTeX for {}: {:#}", entry.raw(), e),
        }
    }
    fetched
}
