//! Read side of the remote package catalog.
//!
//! The transport is a collaborator, not something this crate owns: anything
//! that can answer the two queries of [`Catalog`] can back the server. The
//! shipped [`DirCatalog`] reads a mirrored index directory; [`CachedCatalog`]
//! adds the fixed cache-then-fetch policy every caller goes through.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Deserialize;
use tracing::{debug, warn};

/// One entry of the catalog's list endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSummary {
    pub version: String,
    #[serde(default)]
    pub description: String,
}

/// A parameter a package accepts.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageParameter {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// Full metadata of one published package version.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDetails {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub readme: String,
    #[serde(default)]
    pub source_code_url: Option<String>,
    #[serde(default)]
    pub issue_tracker_url: Option<String>,
    #[serde(default)]
    pub parameters: Vec<PackageParameter>,
}

#[tower_lsp::async_trait]
pub trait Catalog: Send + Sync {
    async fn list_packages(&self) -> anyhow::Result<HashMap<String, PackageSummary>>;
    async fn package_details(&self, name: &str, version: &str) -> anyhow::Result<PackageDetails>;
}

const LIST_FRESH_FOR: Duration = Duration::from_secs(60 * 60);

/// Caching front for a [`Catalog`]. The package list stays fresh for an hour
/// and the last good value is served when a refresh fails; details are
/// immutable once published and cached per `(name, version)`. A failed
/// details fetch is not cached, so a later request can retry. Cache writes
/// are idempotent last-write-wins; concurrent refreshes at worst overwrite
/// with equally fresh data.
pub struct CachedCatalog {
    source: Mutex<Arc<dyn Catalog>>,
    list: Mutex<Option<(Arc<HashMap<String, PackageSummary>>, Instant)>>,
    details: DashMap<(String, String), Arc<PackageDetails>>,
}

impl CachedCatalog {
    pub fn new(source: Arc<dyn Catalog>) -> Self {
        Self {
            source: Mutex::new(source),
            list: Mutex::new(None),
            details: DashMap::new(),
        }
    }

    /// Swap the backing source, dropping cached state from the old one.
    pub fn set_source(&self, source: Arc<dyn Catalog>) {
        *self.source.lock().unwrap() = source;
        *self.list.lock().unwrap() = None;
        self.details.clear();
    }

    /// The package list: cached value while fresh, refetched on expiry,
    /// stale-if-error, empty if it never succeeded.
    pub async fn list(&self) -> Arc<HashMap<String, PackageSummary>> {
        let cached = self.list.lock().unwrap().clone();
        if let Some((map, fetched_at)) = &cached {
            if fetched_at.elapsed() < LIST_FRESH_FOR {
                return map.clone();
            }
        }
        let source = self.source.lock().unwrap().clone();
        match source.list_packages().await {
            Ok(map) => {
                let map = Arc::new(map);
                *self.list.lock().unwrap() = Some((map.clone(), Instant::now()));
                map
            }
            Err(err) => {
                warn!("catalog list fetch failed: {err}");
                cached.map(|(map, _)| map).unwrap_or_default()
            }
        }
    }

    /// Details for `name@version`, or `None` when the catalog can't answer.
    pub async fn details(&self, name: &str, version: &str) -> Option<Arc<PackageDetails>> {
        let key = (name.to_string(), version.to_string());
        if let Some(hit) = self.details.get(&key) {
            return Some(hit.clone());
        }
        let source = self.source.lock().unwrap().clone();
        match source.package_details(name, version).await {
            Ok(details) => {
                let details = Arc::new(details);
                self.details.insert(key, details.clone());
                Some(details)
            }
            Err(err) => {
                debug!("catalog details fetch failed for {name}@{version}: {err}");
                None
            }
        }
    }
}

/// Catalog backed by a local mirror directory: `index.json` mapping package
/// name to its latest summary, plus one `<name>-<version>.json` per
/// published package version.
pub struct DirCatalog {
    root: PathBuf,
}

impl DirCatalog {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[tower_lsp::async_trait]
impl Catalog for DirCatalog {
    async fn list_packages(&self) -> anyhow::Result<HashMap<String, PackageSummary>> {
        let bytes = tokio::fs::read(self.root.join("index.json")).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn package_details(&self, name: &str, version: &str) -> anyhow::Result<PackageDetails> {
        let bytes = tokio::fs::read(self.root.join(format!("{name}-{version}.json"))).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
