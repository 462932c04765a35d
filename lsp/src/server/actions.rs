//! Quickfix assembly: one version-update action per outdated-version
//! diagnostic in range, plus one per outdated package call overlapping the
//! range that has no diagnostic attached yet.

use std::collections::{HashMap, HashSet};

use tower_lsp::lsp_types::{
    CodeAction, CodeActionKind, CodeActionOrCommand, Diagnostic, Range, TextEdit, Url,
    WorkspaceEdit,
};

use taskflow_core::facts;

use super::analysis::DiagnosticData;
use super::catalog::CachedCatalog;
use super::utils::to_lsp_range;

pub async fn code_actions(
    text: &str,
    range: Range,
    diagnostics: &[Diagnostic],
    uri: &Url,
    catalog: &CachedCatalog,
) -> Vec<CodeActionOrCommand> {
    let mut out = Vec::new();
    let mut handled: HashSet<(String, String)> = HashSet::new();

    for diag in diagnostics {
        let Some(data) = &diag.data else {
            continue;
        };
        let Ok(DiagnosticData::OutdatedVersion { name, current, latest }) =
            serde_json::from_value(data.clone())
        else {
            continue;
        };
        out.push(update_action(uri, diag.range, &name, &latest, Some(diag.clone())));
        handled.insert((name, current));
    }

    let sites: Vec<_> = facts::call_sites(text)
        .into_iter()
        .filter(|s| s.line >= range.start.line && s.line <= range.end.line)
        .filter(|s| !handled.contains(&(s.name.clone(), s.version.clone())))
        .collect();
    if !sites.is_empty() {
        let listing = catalog.list().await;
        for site in sites {
            let Some(summary) = listing.get(&site.name) else {
                continue;
            };
            if summary.version == site.version {
                continue;
            }
            out.push(update_action(
                uri,
                to_lsp_range(site.version_span),
                &site.name,
                &summary.version,
                None,
            ));
        }
    }

    out
}

/// A single textual replacement of the version token.
fn update_action(
    uri: &Url,
    range: Range,
    name: &str,
    latest: &str,
    diagnostic: Option<Diagnostic>,
) -> CodeActionOrCommand {
    let edit = TextEdit {
        range,
        new_text: latest.to_string(),
    };
    let mut changes = HashMap::new();
    changes.insert(uri.clone(), vec![edit]);

    CodeActionOrCommand::CodeAction(CodeAction {
        title: format!("Update {name} to {latest}"),
        kind: Some(CodeActionKind::QUICKFIX),
        diagnostics: diagnostic.map(|d| vec![d]),
        edit: Some(WorkspaceEdit {
            changes: Some(changes),
            ..Default::default()
        }),
        ..Default::default()
    })
}
