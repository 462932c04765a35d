use std::collections::HashMap;
use std::sync::Arc;

use tower_lsp::lsp_types::{HoverContents, MarkupContent, Position};

use taskflow_lsp::server::catalog::{CachedCatalog, Catalog, PackageDetails, PackageParameter, PackageSummary};
use taskflow_lsp::server::hover;

struct DetailsCatalog(PackageDetails);

#[tower_lsp::async_trait]
impl Catalog for DetailsCatalog {
    async fn list_packages(&self) -> anyhow::Result<HashMap<String, PackageSummary>> {
        Ok(HashMap::new())
    }

    async fn package_details(&self, name: &str, version: &str) -> anyhow::Result<PackageDetails> {
        if self.0.name == name && self.0.version == version {
            Ok(self.0.clone())
        } else {
            anyhow::bail!("unknown package {name}@{version}")
        }
    }
}

fn markdown(contents: &HoverContents) -> &str {
    match contents {
        HoverContents::Markup(MarkupContent { value, .. }) => value,
        other => panic!("expected markup contents, got {other:?}"),
    }
}

#[tokio::test]
async fn anchor_hover_shows_the_anchored_block() {
    let catalog = CachedCatalog::new(Arc::new(DetailsCatalog(PackageDetails {
        name: String::new(),
        version: String::new(),
        description: String::new(),
        readme: String::new(),
        source_code_url: None,
        issue_tracker_url: None,
        parameters: Vec::new(),
    })));
    let text = "defaults: &base\n  image: alpine\ntasks:\n  - key: one\n    env: *base\n";

    let on_anchor = hover::hover(text, Position::new(0, 12), &catalog).await.unwrap();
    let md = markdown(&on_anchor.contents);
    assert!(md.starts_with("```yaml\n"));
    assert!(md.contains("image: alpine"));

    // the highlighted range covers the token including its sigil
    let range = on_anchor.range.unwrap();
    assert_eq!(range.start.character, 10);
    assert_eq!(range.end.character, 15);

    let on_alias = hover::hover(text, Position::new(4, 10), &catalog).await.unwrap();
    assert_eq!(markdown(&on_alias.contents), md);
}

#[tokio::test]
async fn package_hover_renders_sections_in_order() {
    let details = PackageDetails {
        name: "docker-build".to_string(),
        version: "2.1.0".to_string(),
        description: "Builds container images.".to_string(),
        readme: String::new(),
        source_code_url: Some("https://example.com/src".to_string()),
        issue_tracker_url: Some("https://example.com/issues".to_string()),
        parameters: vec![
            PackageParameter {
                name: "tag".to_string(),
                required: false,
                default: Some("latest".to_string()),
                description: "Image tag".to_string(),
            },
            PackageParameter {
                name: "image".to_string(),
                required: true,
                default: None,
                description: String::new(),
            },
        ],
    };
    let catalog = CachedCatalog::new(Arc::new(DetailsCatalog(details)));

    let text = "tasks:\n  - key: a\n    call: docker-build 2.1.0\n";
    let hover = hover::hover(text, Position::new(2, 12), &catalog).await.unwrap();
    let md = markdown(&hover.contents);

    let title = md.find("## docker-build `2.1.0`").unwrap();
    let description = md.find("Builds container images.").unwrap();
    let source = md.find("[Source code](https://example.com/src)").unwrap();
    let issues = md.find("[Issue tracker](https://example.com/issues)").unwrap();
    let params = md.find("### Parameters").unwrap();
    assert!(title < description && description < source && source < issues && issues < params);

    // required parameter listed before the optional one
    let image = md.find("- `image` (required)").unwrap();
    let tag = md.find("- `tag` (optional), default `latest`: Image tag").unwrap();
    assert!(image < tag);
}

#[tokio::test]
async fn hover_on_plain_text_returns_nothing() {
    let catalog = CachedCatalog::new(Arc::new(DetailsCatalog(PackageDetails {
        name: String::new(),
        version: String::new(),
        description: String::new(),
        readme: String::new(),
        source_code_url: None,
        issue_tracker_url: None,
        parameters: Vec::new(),
    })));
    let text = "tasks:\n  - key: a\n    run: echo hi\n";
    assert!(hover::hover(text, Position::new(2, 10), &catalog).await.is_none());
}
