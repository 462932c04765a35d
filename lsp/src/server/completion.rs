//! Completion assembly, dispatched on the classified cursor context.
//!
//! Each arm maps extracted facts into items of the right kind: task keys for
//! dependency lists, catalog packages after `call:`, package parameters
//! under `with:`, directory entries for embedded file references.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind, Position};

use taskflow_core::context::{self, CursorContext};
use taskflow_core::facts;

use super::catalog::CachedCatalog;
use super::utils::to_core_pos;

/// Typed payload round-tripped through completion item `data`, keyed by the
/// item's kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ItemData {
    #[serde(rename_all = "camelCase")]
    TaskKey { name: String },
    #[serde(rename_all = "camelCase")]
    Package { name: String, version: String },
    #[serde(rename_all = "camelCase")]
    Parameter {
        package: String,
        version: String,
        name: String,
    },
    #[serde(rename_all = "camelCase")]
    Path { path: String },
}

/// Completion entry point. Returns an empty list when no recognized context
/// applies at the cursor.
pub async fn completions(
    text: &str,
    pos: Position,
    doc_path: Option<&Path>,
    catalog: &CachedCatalog,
) -> Vec<CompletionItem> {
    let cpos = to_core_pos(pos);
    match context::classify(text, cpos) {
        Some(CursorContext::TaskDependencyList) => dependency_items(text, cpos),
        Some(CursorContext::EmbeddedFilePath { partial }) => path_items(doc_path, &partial).await,
        Some(CursorContext::PackageCall) => package_items(catalog).await,
        Some(CursorContext::ParameterBlock) => parameter_items(text, cpos, catalog).await,
        None => Vec::new(),
    }
}

/// Declared task keys, declaration order preserved through `sort_text`.
fn dependency_items(text: &str, pos: taskflow_core::Pos) -> Vec<CompletionItem> {
    facts::task_keys(text, Some(pos))
        .into_iter()
        .enumerate()
        .map(|(i, key)| CompletionItem {
            label: key.clone(),
            kind: Some(CompletionItemKind::REFERENCE),
            detail: Some("task".to_string()),
            sort_text: Some(format!("{i:04}")),
            data: serde_json::to_value(ItemData::TaskKey { name: key }).ok(),
            ..Default::default()
        })
        .collect()
}

/// Catalog packages, alphabetical, inserting `name version` in one go.
async fn package_items(catalog: &CachedCatalog) -> Vec<CompletionItem> {
    let listing = catalog.list().await;
    let mut names: Vec<&String> = listing.keys().collect();
    names.sort();
    names
        .into_iter()
        .map(|name| {
            let summary = &listing[name];
            CompletionItem {
                label: name.clone(),
                kind: Some(CompletionItemKind::MODULE),
                detail: Some(format!("{} {}", summary.version, summary.description)),
                insert_text: Some(format!("{} {}", name, summary.version)),
                data: serde_json::to_value(ItemData::Package {
                    name: name.clone(),
                    version: summary.version.clone(),
                })
                .ok(),
                ..Default::default()
            }
        })
        .collect()
}

/// Parameters of the enclosing package call, required first, then
/// alphabetical.
async fn parameter_items(
    text: &str,
    pos: taskflow_core::Pos,
    catalog: &CachedCatalog,
) -> Vec<CompletionItem> {
    let Some((name, version)) = facts::enclosing_package_call(text, pos) else {
        return Vec::new();
    };
    let Some(details) = catalog.details(&name, &version).await else {
        return Vec::new();
    };

    let mut params = details.parameters.clone();
    params.sort_by(|a, b| b.required.cmp(&a.required).then_with(|| a.name.cmp(&b.name)));

    params
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let mut detail = if p.required {
                "required".to_string()
            } else {
                "optional".to_string()
            };
            if let Some(default) = &p.default {
                detail.push_str(&format!(", default: {default}"));
            }
            CompletionItem {
                label: p.name.clone(),
                kind: Some(CompletionItemKind::FIELD),
                detail: Some(detail),
                documentation: (!p.description.is_empty())
                    .then(|| tower_lsp::lsp_types::Documentation::String(p.description.clone())),
                insert_text: Some(format!("{}: ", p.name)),
                sort_text: Some(format!("{i:04}")),
                data: serde_json::to_value(ItemData::Parameter {
                    package: name.clone(),
                    version: version.clone(),
                    name: p.name,
                })
                .ok(),
                ..Default::default()
            }
        })
        .collect()
}

/// Directory entries next to the document for an embedded file reference:
/// folders before files, each group alphabetical; hidden entries, the open
/// document itself, and non-YAML files are excluded.
async fn path_items(doc_path: Option<&Path>, partial: &str) -> Vec<CompletionItem> {
    let Some(doc_path) = doc_path else {
        return Vec::new();
    };
    let Some(base) = doc_path.parent() else {
        return Vec::new();
    };
    // everything up to the last `/` of the partial path is already a
    // directory choice; list inside it
    let dir = match partial.rsplit_once('/') {
        Some((sub, _)) => base.join(sub),
        None => base.to_path_buf(),
    };
    let current = doc_path.to_path_buf();

    tokio::task::spawn_blocking(move || list_directory(&dir, &current))
        .await
        .unwrap_or_default()
}

fn list_directory(dir: &PathBuf, current: &Path) -> Vec<CompletionItem> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut folders = Vec::new();
    let mut files = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let display = name.to_string_lossy().into_owned();
        if display.starts_with('.') {
            continue;
        }
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir {
            folders.push(display);
        } else {
            // exclusion is by full path; a same-named file elsewhere stays
            if entry.path() == current {
                continue;
            }
            if !(display.ends_with(".yaml") || display.ends_with(".yml")) {
                continue;
            }
            files.push(display);
        }
    }
    folders.sort();
    files.sort();

    let mut out = Vec::new();
    for (i, name) in folders.into_iter().enumerate() {
        out.push(CompletionItem {
            label: name.clone(),
            kind: Some(CompletionItemKind::FOLDER),
            insert_text: Some(format!("{name}/")),
            sort_text: Some(format!("0{i:04}")),
            data: serde_json::to_value(ItemData::Path { path: name }).ok(),
            ..Default::default()
        });
    }
    for (i, name) in files.into_iter().enumerate() {
        out.push(CompletionItem {
            label: name.clone(),
            kind: Some(CompletionItemKind::FILE),
            sort_text: Some(format!("1{i:04}")),
            data: serde_json::to_value(ItemData::Path { path: name }).ok(),
            ..Default::default()
        });
    }
    out
}
