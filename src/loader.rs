//! Manifest loader for the gallery.
//!
//! Resolves the manifest to render through an ordered chain of tiers:
//!
//! 1. **Remote**: `GET <remote_base>/manifest.json`. Skipped when no base URL
//!    is configured. Succeeds on a 2xx response whose body parses.
//! 2. **Local**: the deployment's own `manifest.json`.
//! 3. **Empty**: an empty manifest. The gallery shows its "no photos" state.
//!
//! Every tier that fails is logged and recorded in
//! [`LoadOutcome::attempts`]; nothing is retried and no error escapes
//! [`ManifestLoader::load`].
//!
//! A remote manifest is reused for [`LoaderConfig::ttl`] after it was
//! fetched. The cache lock is held during the fetch, so concurrent callers
//! wait for the request already in flight instead of sending their own.

use crate::config::SiteConfig;
use crate::manifest::MANIFEST_FILENAME;
use crate::types::Manifest;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default freshness window for a fetched manifest (1 hour).
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Default HTTP timeout for the manifest request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("malformed remote manifest: {0}")]
    Parse(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum LocalReadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed local manifest {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Why a tier was passed over.
#[derive(Error, Debug)]
pub enum TierFailure {
    #[error("remote: {0}")]
    Remote(#[from] FetchError),
    #[error("local: {0}")]
    Local(#[from] LocalReadError),
}

/// Which tier produced the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestSource {
    Remote,
    Local,
    Empty,
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub manifest: Manifest,
    pub source: ManifestSource,
    pub attempts: Vec<TierFailure>,
}

/// Raw HTTP reply handed back by a [`ManifestFetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

/// HTTP GET capability the loader depends on.
///
/// Implementations report transport failures as [`FetchError::Network`] and
/// leave status and body interpretation to the loader.
pub trait ManifestFetch: Send + Sync {
    fn get(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// [`ManifestFetch`] over a blocking `reqwest` client.
pub struct HttpFetch {
    /// Build error text when the client could not be created.
    client: Result<Client, String>,
}

impl HttpFetch {
    /// A client that fails to build makes every `get` a network error, so
    /// the loader moves on to the local tier.
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            warn!(error = %e, "cannot build HTTP client, remote manifest disabled");
            e.to_string()
        });
        Self { client }
    }
}

impl ManifestFetch for HttpFetch {
    fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let client = self
            .client
            .as_ref()
            .map_err(|e| FetchError::Network(format!("HTTP client unavailable: {e}")))?;
        let response = client
            .get(url)
            .header(USER_AGENT, concat!("folio/", env!("CARGO_PKG_VERSION")))
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(FetchResponse { status, body })
    }
}

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Public base URL of the object store. `None` or blank skips the remote tier.
    pub remote_base: Option<String>,
    /// Fallback manifest on local storage.
    pub local_path: PathBuf,
    pub ttl: Duration,
    pub timeout: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            remote_base: None,
            local_path: PathBuf::from(MANIFEST_FILENAME),
            ttl: DEFAULT_TTL,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl LoaderConfig {
    pub fn from_site_config(config: &SiteConfig, local_path: &Path) -> Self {
        Self {
            remote_base: config.remote.base_url.clone(),
            local_path: local_path.to_path_buf(),
            ttl: config.remote.manifest_ttl(),
            timeout: config.remote.timeout(),
        }
    }

    /// `<remote_base>/manifest.json`, or `None` when there is no usable base.
    pub fn remote_url(&self) -> Option<String> {
        let base = self.remote_base.as_deref()?.trim();
        if base.is_empty() {
            return None;
        }
        Some(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            MANIFEST_FILENAME
        ))
    }
}

struct Cached {
    manifest: Manifest,
    fetched_at: Instant,
}

pub struct ManifestLoader<F = HttpFetch> {
    config: LoaderConfig,
    fetch: F,
    cache: Mutex<Option<Cached>>,
}

impl ManifestLoader<HttpFetch> {
    pub fn new(config: LoaderConfig) -> Self {
        let fetch = HttpFetch::new(config.timeout);
        Self::with_fetch(config, fetch)
    }
}

impl<F: ManifestFetch> ManifestLoader<F> {
    pub fn with_fetch(config: LoaderConfig, fetch: F) -> Self {
        Self {
            config,
            fetch,
            cache: Mutex::new(None),
        }
    }

    /// Walk the tiers and return the first manifest that loads.
    pub fn load(&self) -> LoadOutcome {
        let mut attempts = Vec::new();

        match self.config.remote_url() {
            None => debug!("no remote base URL, skipping remote manifest"),
            Some(url) => match self.load_remote(&url, &mut attempts) {
                Ok(manifest) => {
                    info!(url = %url, entries = manifest.len(), "loaded remote manifest");
                    return LoadOutcome {
                        manifest,
                        source: ManifestSource::Remote,
                        attempts,
                    };
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "remote manifest unavailable, trying local");
                    attempts.push(TierFailure::Remote(e));
                }
            },
        }

        match read_local(&self.config.local_path) {
            Ok(manifest) => {
                info!(
                    path = %self.config.local_path.display(),
                    entries = manifest.len(),
                    "loaded local manifest"
                );
                LoadOutcome {
                    manifest,
                    source: ManifestSource::Local,
                    attempts,
                }
            }
            Err(e) => {
                warn!(error = %e, "local manifest unavailable, rendering empty gallery");
                attempts.push(TierFailure::Local(e));
                LoadOutcome {
                    manifest: Manifest::empty(),
                    source: ManifestSource::Empty,
                    attempts,
                }
            }
        }
    }

    /// Fresh cached copy, else a new fetch. When a refetch fails, an expired
    /// copy is still served and the failure goes to `attempts`.
    fn load_remote(
        &self,
        url: &str,
        attempts: &mut Vec<TierFailure>,
    ) -> Result<Manifest, FetchError> {
        // Held across the fetch: one request in flight at a time.
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(cached) = cache.as_ref()
            && cached.fetched_at.elapsed() < self.config.ttl
        {
            debug!(age = ?cached.fetched_at.elapsed(), "using cached remote manifest");
            return Ok(cached.manifest.clone());
        }

        match self.fetch_remote(url) {
            Ok(manifest) => {
                *cache = Some(Cached {
                    manifest: manifest.clone(),
                    fetched_at: Instant::now(),
                });
                Ok(manifest)
            }
            Err(e) => match cache.as_ref() {
                Some(stale) => {
                    warn!(
                        url = %url,
                        error = %e,
                        age = ?stale.fetched_at.elapsed(),
                        "refetch failed, serving stale remote manifest"
                    );
                    attempts.push(TierFailure::Remote(e));
                    Ok(stale.manifest.clone())
                }
                None => Err(e),
            },
        }
    }

    fn fetch_remote(&self, url: &str) -> Result<Manifest, FetchError> {
        debug!(url = %url, "fetching remote manifest");
        let response = self.fetch.get(url)?;
        if !(200..300).contains(&response.status) {
            return Err(FetchError::Status(response.status));
        }
        serde_json::from_str(&response.body).map_err(FetchError::Parse)
    }
}

/// Read and parse a manifest from local storage.
pub fn read_local(path: &Path) -> Result<Manifest, LocalReadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LocalReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| LocalReadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
