//! Diagnostics assembly and debounced publishing.
//!
//! Structural parse errors come first, then outdated-package warnings; the
//! combined list is truncated to the configured maximum. A fault inside the
//! parser never escapes a request: it degrades to a single generic
//! diagnostic at the start of the document.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Duration};
use tower_lsp::lsp_types::{
    Diagnostic, DiagnosticSeverity, NumberOrString, Position, Range, Url,
};

use taskflow_core::{facts, parse};

use super::catalog::CachedCatalog;
use super::state::TaskflowLanguageServer;
use super::utils::{is_workflow_uri, to_lsp_range};

pub const DIAGNOSTIC_SOURCE: &str = "taskflow";
pub const OUTDATED_VERSION_CODE: &str = "outdated-version";

/// Typed payload round-tripped through diagnostic `data`, keyed by kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DiagnosticData {
    #[serde(rename_all = "camelCase")]
    OutdatedVersion {
        name: String,
        current: String,
        latest: String,
    },
}

/// Parser-error diagnostics only; synchronous, catalog-free.
pub fn parse_diagnostics(text: &str) -> Vec<Diagnostic> {
    match parse::parse_document(text) {
        Ok(_) => Vec::new(),
        Err(issue) => {
            let at = Position::new(issue.line, issue.character);
            vec![Diagnostic {
                range: Range::new(at, at),
                severity: Some(DiagnosticSeverity::ERROR),
                source: Some(DIAGNOSTIC_SOURCE.to_string()),
                message: issue.message,
                ..Default::default()
            }]
        }
    }
}

/// All diagnostics for a buffer, truncated to `max`.
pub async fn compute_diagnostics(text: &str, catalog: &CachedCatalog, max: usize) -> Vec<Diagnostic> {
    let mut out = parse_diagnostics(text);

    let sites = facts::call_sites(text);
    if !sites.is_empty() {
        let listing = catalog.list().await;
        for site in sites {
            let Some(summary) = listing.get(&site.name) else {
                continue;
            };
            if summary.version == site.version {
                continue;
            }
            let data = DiagnosticData::OutdatedVersion {
                name: site.name.clone(),
                current: site.version.clone(),
                latest: summary.version.clone(),
            };
            out.push(Diagnostic {
                range: to_lsp_range(site.version_span),
                severity: Some(DiagnosticSeverity::WARNING),
                code: Some(NumberOrString::String(OUTDATED_VERSION_CODE.to_string())),
                source: Some(DIAGNOSTIC_SOURCE.to_string()),
                message: format!(
                    "Package '{}' {} is outdated, latest is {}",
                    site.name, site.version, summary.version
                ),
                data: serde_json::to_value(&data).ok(),
                ..Default::default()
            });
        }
    }

    out.truncate(max);
    out
}

impl TaskflowLanguageServer {
    /// Debounced diagnostics for one document version. Snapshots of version
    /// and edit sequence guard the cache write, so a stale computation never
    /// overwrites the state of a newer edit.
    pub(crate) async fn schedule_diagnostics(&self, uri: Url, scheduled_version: i32, delay_ms: u64) {
        let documents = self.documents.clone();
        let client = self.client.clone();
        let catalog = self.catalog.clone();
        let max = self.config.lock().unwrap().max_diagnostics;
        tokio::spawn(async move {
            sleep(Duration::from_millis(delay_ms)).await;

            let (content, seq, version) = match documents.get(&uri) {
                Some(doc) => (doc.content.to_string(), doc.debounce_seq, doc.version),
                None => return,
            };
            if version != scheduled_version {
                return;
            }
            if !is_workflow_uri(&uri) {
                return;
            }

            let diagnostics = compute_diagnostics(&content, &catalog, max).await;
            if let Some(mut doc) = documents.get_mut(&uri) {
                if doc.debounce_seq == seq && doc.version == version {
                    doc.cached_diagnostics = Some(Arc::new(diagnostics.clone()));
                }
            }
            client.publish_diagnostics(uri.clone(), diagnostics, Some(version)).await;
        });
    }
}
