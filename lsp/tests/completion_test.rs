use std::collections::HashMap;
use std::sync::Arc;

use tower_lsp::lsp_types::{CompletionItemKind, Position};

use taskflow_lsp::server::catalog::{CachedCatalog, Catalog, PackageDetails, PackageParameter, PackageSummary};
use taskflow_lsp::server::completion;

struct EmptyCatalog;

#[tower_lsp::async_trait]
impl Catalog for EmptyCatalog {
    async fn list_packages(&self) -> anyhow::Result<HashMap<String, PackageSummary>> {
        Ok(HashMap::new())
    }

    async fn package_details(&self, _name: &str, _version: &str) -> anyhow::Result<PackageDetails> {
        anyhow::bail!("no details published")
    }
}

struct FixedCatalog {
    listing: HashMap<String, PackageSummary>,
    details: Option<PackageDetails>,
}

#[tower_lsp::async_trait]
impl Catalog for FixedCatalog {
    async fn list_packages(&self) -> anyhow::Result<HashMap<String, PackageSummary>> {
        Ok(self.listing.clone())
    }

    async fn package_details(&self, name: &str, version: &str) -> anyhow::Result<PackageDetails> {
        match &self.details {
            Some(d) if d.name == name && d.version == version => Ok(d.clone()),
            _ => anyhow::bail!("unknown package {name}@{version}"),
        }
    }
}

fn summary(version: &str, description: &str) -> PackageSummary {
    PackageSummary {
        version: version.to_string(),
        description: description.to_string(),
    }
}

#[tokio::test]
async fn dependency_completion_lists_declared_tasks_in_declaration_order() {
    let catalog = CachedCatalog::new(Arc::new(EmptyCatalog));
    let text = "tasks:\n  - key: zeta\n    run: a\n  - key: alpha\n    run: b\n  - key: mid\n    use: ";
    let items = completion::completions(text, Position::new(6, 9), None, &catalog).await;
    let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, ["zeta", "alpha", "mid"]);
    // declaration order survives client-side sorting through sort_text
    assert!(items[0].sort_text.as_deref() < items[1].sort_text.as_deref());
}

#[tokio::test]
async fn dangling_open_list_still_completes_all_tasks() {
    let catalog = CachedCatalog::new(Arc::new(EmptyCatalog));
    let text = "tasks:\n  - key: build\n    run: a\n  - key: test\n    use: [bu";
    let items = completion::completions(text, Position::new(4, 12), None, &catalog).await;
    let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, ["build", "test"]);
}

#[tokio::test]
async fn open_list_spanning_lines_still_completes_all_tasks() {
    let catalog = CachedCatalog::new(Arc::new(EmptyCatalog));
    let text = "tasks:\n  - key: build\n    run: a\n  - key: test\n    use: [build,\n      ";
    let items = completion::completions(text, Position::new(5, 6), None, &catalog).await;
    let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, ["build", "test"]);
}

#[tokio::test]
async fn package_completion_offers_catalog_entries() {
    let mut listing = HashMap::new();
    listing.insert("docker-build".to_string(), summary("2.1.0", "Build images"));
    listing.insert("aws-deploy".to_string(), summary("0.9.1", "Deploy to AWS"));
    let catalog = CachedCatalog::new(Arc::new(FixedCatalog { listing, details: None }));

    let text = "tasks:\n  - key: a\n    call: ";
    let items = completion::completions(text, Position::new(2, 10), None, &catalog).await;
    let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, ["aws-deploy", "docker-build"]);
    assert_eq!(items[1].insert_text.as_deref(), Some("docker-build 2.1.0"));
    assert_eq!(items[0].kind, Some(CompletionItemKind::MODULE));
}

#[tokio::test]
async fn parameter_completion_sorts_required_first_then_alphabetical() {
    let details = PackageDetails {
        name: "docker-build".to_string(),
        version: "2.1.0".to_string(),
        description: String::new(),
        readme: String::new(),
        source_code_url: None,
        issue_tracker_url: None,
        parameters: vec![
            PackageParameter {
                name: "tag".to_string(),
                required: false,
                default: Some("latest".to_string()),
                description: String::new(),
            },
            PackageParameter {
                name: "image".to_string(),
                required: true,
                default: None,
                description: "Image name".to_string(),
            },
            PackageParameter {
                name: "cache".to_string(),
                required: false,
                default: None,
                description: String::new(),
            },
            PackageParameter {
                name: "context".to_string(),
                required: true,
                default: None,
                description: String::new(),
            },
        ],
    };
    let catalog = CachedCatalog::new(Arc::new(FixedCatalog {
        listing: HashMap::new(),
        details: Some(details),
    }));

    let text = "tasks:\n  - key: a\n    call: docker-build 2.1.0\n    with:\n      ";
    let items = completion::completions(text, Position::new(4, 6), None, &catalog).await;
    let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, ["context", "image", "cache", "tag"]);
    assert_eq!(items[0].insert_text.as_deref(), Some("context: "));
}

#[tokio::test]
async fn unknown_context_returns_no_items() {
    let catalog = CachedCatalog::new(Arc::new(EmptyCatalog));
    let text = "tasks:\n  - key: a\n    run: echo hi";
    let items = completion::completions(text, Position::new(2, 12), None, &catalog).await;
    assert!(items.is_empty());
}

#[tokio::test]
async fn parameter_completion_degrades_when_details_unavailable() {
    let catalog = CachedCatalog::new(Arc::new(EmptyCatalog));
    let text = "tasks:\n  - key: a\n    call: ghost 1.0.0\n    with:\n      ";
    let items = completion::completions(text, Position::new(4, 6), None, &catalog).await;
    assert!(items.is_empty());
}
