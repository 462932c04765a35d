//! Hover payloads for anchors/aliases and package calls.

use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position, Range};

use taskflow_core::{facts, scan};

use super::catalog::{CachedCatalog, PackageDetails};

/// Hover at a position, or `None` when nothing recognizable sits there.
pub async fn hover(text: &str, pos: Position, catalog: &CachedCatalog) -> Option<Hover> {
    let line = text.lines().nth(pos.line as usize)?;

    // anchor or alias: show what the anchor stands for
    if let Some(token) =
        scan::anchor_at(line, pos.character).or_else(|| scan::alias_at(line, pos.character))
    {
        let content = facts::anchor_content(text, &token.text)?;
        return Some(Hover {
            contents: markdown(format!("```yaml\n{content}\n```")),
            range: Some(Range::new(
                Position::new(pos.line, token.start),
                Position::new(pos.line, token.end),
            )),
        });
    }

    // package call: the catalog card for name@version
    if let Some((name, version)) = facts::package_call_on_line(line) {
        let details = catalog.details(&name, &version).await?;
        return Some(Hover {
            contents: markdown(package_markdown(&details)),
            range: None,
        });
    }

    None
}

fn markdown(value: String) -> HoverContents {
    HoverContents::Markup(MarkupContent {
        kind: MarkupKind::Markdown,
        value,
    })
}

/// Fixed section order: title with version, description, source-code link,
/// issue-tracker link, parameter list sorted required-first then
/// alphabetical.
pub fn package_markdown(details: &PackageDetails) -> String {
    let mut md = format!("## {} `{}`\n", details.name, details.version);
    if !details.description.is_empty() {
        md.push('\n');
        md.push_str(&details.description);
        md.push('\n');
    }
    if let Some(url) = &details.source_code_url {
        md.push_str(&format!("\n[Source code]({url})\n"));
    }
    if let Some(url) = &details.issue_tracker_url {
        md.push_str(&format!("\n[Issue tracker]({url})\n"));
    }
    if !details.parameters.is_empty() {
        md.push_str("\n### Parameters\n\n");
        let mut params = details.parameters.clone();
        params.sort_by(|a, b| b.required.cmp(&a.required).then_with(|| a.name.cmp(&b.name)));
        for p in params {
            let requirement = if p.required { "required" } else { "optional" };
            md.push_str(&format!("- `{}` ({requirement})", p.name));
            if let Some(default) = &p.default {
                md.push_str(&format!(", default `{default}`"));
            }
            if !p.description.is_empty() {
                md.push_str(&format!(": {}", p.description));
            }
            md.push('\n');
        }
    }
    md
}
