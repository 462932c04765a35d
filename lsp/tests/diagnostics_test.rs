use std::collections::HashMap;
use std::sync::Arc;

use tower_lsp::lsp_types::{CodeActionOrCommand, DiagnosticSeverity, NumberOrString, Position, Range, Url};

use taskflow_lsp::server::analysis::{self, OUTDATED_VERSION_CODE};
use taskflow_lsp::server::catalog::{CachedCatalog, Catalog, PackageDetails, PackageSummary};
use taskflow_lsp::server::{actions, completion};

struct FailingCatalog;

#[tower_lsp::async_trait]
impl Catalog for FailingCatalog {
    async fn list_packages(&self) -> anyhow::Result<HashMap<String, PackageSummary>> {
        anyhow::bail!("catalog unreachable")
    }

    async fn package_details(&self, _name: &str, _version: &str) -> anyhow::Result<PackageDetails> {
        anyhow::bail!("catalog unreachable")
    }
}

struct ListingCatalog(HashMap<String, PackageSummary>);

#[tower_lsp::async_trait]
impl Catalog for ListingCatalog {
    async fn list_packages(&self) -> anyhow::Result<HashMap<String, PackageSummary>> {
        Ok(self.0.clone())
    }

    async fn package_details(&self, name: &str, version: &str) -> anyhow::Result<PackageDetails> {
        anyhow::bail!("no details for {name}@{version}")
    }
}

fn listing(entries: &[(&str, &str)]) -> CachedCatalog {
    let map = entries
        .iter()
        .map(|(name, version)| {
            (
                name.to_string(),
                PackageSummary {
                    version: version.to_string(),
                    description: String::new(),
                },
            )
        })
        .collect();
    CachedCatalog::new(Arc::new(ListingCatalog(map)))
}

const DOC: &str = "tasks:\n  - key: a\n    call: docker-build 1.0.0\n";

#[tokio::test]
async fn outdated_call_produces_a_warning_on_the_version_token() {
    let catalog = listing(&[("docker-build", "2.1.0")]);
    let diags = analysis::compute_diagnostics(DOC, &catalog, 100).await;
    assert_eq!(diags.len(), 1);
    let diag = &diags[0];
    assert_eq!(diag.severity, Some(DiagnosticSeverity::WARNING));
    assert_eq!(
        diag.code,
        Some(NumberOrString::String(OUTDATED_VERSION_CODE.to_string()))
    );
    assert_eq!(diag.range.start.line, 2);
    assert_eq!(diag.range.start.character, 23);
    assert_eq!(diag.range.end.character, 28);
}

#[tokio::test]
async fn up_to_date_call_is_silent() {
    let catalog = listing(&[("docker-build", "1.0.0")]);
    let diags = analysis::compute_diagnostics(DOC, &catalog, 100).await;
    assert!(diags.is_empty());
}

#[tokio::test]
async fn catalog_failure_without_prior_cache_yields_no_version_diagnostics() {
    let catalog = CachedCatalog::new(Arc::new(FailingCatalog));
    let diags = analysis::compute_diagnostics(DOC, &catalog, 100).await;
    assert!(diags.is_empty());
}

#[tokio::test]
async fn parse_errors_surface_with_error_severity() {
    let text = "tasks:\n  - key: [broken\n";
    let diags = analysis::parse_diagnostics(text);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].severity, Some(DiagnosticSeverity::ERROR));
}

#[tokio::test]
async fn diagnostics_are_truncated_to_the_configured_maximum() {
    let mut text = String::from("tasks:\n");
    for i in 0..5 {
        text.push_str(&format!("  - key: t{i}\n    call: docker-build 1.0.0\n"));
    }
    let catalog = listing(&[("docker-build", "2.1.0")]);
    let diags = analysis::compute_diagnostics(&text, &catalog, 3).await;
    assert_eq!(diags.len(), 3);
}

#[tokio::test]
async fn update_edit_round_trips_to_the_latest_version() {
    let uri = Url::parse("file:///repo/taskflows/p.yaml").unwrap();
    let catalog = listing(&[("docker-build", "2.1.0")]);
    let diags = analysis::compute_diagnostics(DOC, &catalog, 100).await;

    let whole = Range::new(Position::new(0, 0), Position::new(10, 0));
    let fixes = actions::code_actions(DOC, whole, &diags, &uri, &catalog).await;
    assert_eq!(fixes.len(), 1);
    let CodeActionOrCommand::CodeAction(action) = &fixes[0] else {
        panic!("expected a code action");
    };
    assert_eq!(action.title, "Update docker-build to 2.1.0");

    let edits = &action.edit.as_ref().unwrap().changes.as_ref().unwrap()[&uri];
    assert_eq!(edits.len(), 1);
    let edit = &edits[0];

    // apply the edit: the line must be identical except for the version token
    let line = DOC.lines().nth(edit.range.start.line as usize).unwrap();
    let patched = format!(
        "{}{}{}",
        &line[..edit.range.start.character as usize],
        edit.new_text,
        &line[edit.range.end.character as usize..]
    );
    assert_eq!(patched, "    call: docker-build 2.1.0");
}

#[tokio::test]
async fn calls_in_range_without_diagnostics_still_get_actions() {
    let uri = Url::parse("file:///repo/taskflows/p.yaml").unwrap();
    let catalog = listing(&[("docker-build", "2.1.0")]);
    let whole = Range::new(Position::new(0, 0), Position::new(10, 0));
    let fixes = actions::code_actions(DOC, whole, &[], &uri, &catalog).await;
    assert_eq!(fixes.len(), 1);
}

#[tokio::test]
async fn stale_catalog_swap_clears_cached_state() {
    let catalog = CachedCatalog::new(Arc::new(FailingCatalog));
    assert!(catalog.list().await.is_empty());

    catalog.set_source(Arc::new(ListingCatalog(
        [(
            "docker-build".to_string(),
            PackageSummary {
                version: "2.1.0".to_string(),
                description: String::new(),
            },
        )]
        .into_iter()
        .collect(),
    )));
    assert_eq!(catalog.list().await.len(), 1);
}

#[tokio::test]
async fn failed_details_are_not_cached_and_features_degrade() {
    let catalog = CachedCatalog::new(Arc::new(FailingCatalog));
    assert!(catalog.details("docker-build", "1.0.0").await.is_none());

    // parameter completion backed by the failing catalog returns nothing
    let text = "tasks:\n  - key: a\n    call: docker-build 1.0.0\n    with:\n      ";
    let items = completion::completions(text, Position::new(4, 6), None, &catalog).await;
    assert!(items.is_empty());
}
