//! Definition and references over task keys, anchors, and embedded file
//! references.

use tower_lsp::lsp_types::{Location, LocationLink, Position, Range, Url};

use taskflow_core::context::{self, CursorContext};
use taskflow_core::{facts, scan, Span};

use super::utils::{to_core_pos, to_lsp_range};

fn line_at(text: &str, line: u32) -> Option<&str> {
    text.lines().nth(line as usize)
}

fn link(uri: Url, origin: Range, target: Span) -> LocationLink {
    let target_range = to_lsp_range(target);
    LocationLink {
        origin_selection_range: Some(origin),
        target_uri: uri,
        target_range,
        target_selection_range: target_range,
    }
}

/// Go-to-definition. `None` when no navigable token sits at the cursor.
pub fn definition(text: &str, pos: Position, uri: &Url) -> Option<Vec<LocationLink>> {
    let line = line_at(text, pos.line)?;

    // alias to its anchor
    if let Some(alias) = scan::alias_at(line, pos.character) {
        let target = facts::find_anchor(text, &alias.text)?;
        let origin = Range::new(
            Position::new(pos.line, alias.start),
            Position::new(pos.line, alias.end),
        );
        return Some(vec![link(uri.clone(), origin, target)]);
    }

    // embedded file reference to the referenced document
    if let Some((path, span)) = facts::embedded_path_on_line(line, pos.line) {
        if span.contains(to_core_pos(pos)) {
            let target_uri = uri.join(&path).ok()?;
            let zero = Range::new(Position::new(0, 0), Position::new(0, 0));
            return Some(vec![LocationLink {
                origin_selection_range: Some(to_lsp_range(span)),
                target_uri,
                target_range: zero,
                target_selection_range: zero,
            }]);
        }
    }

    // task key usage to its definition line; in a dependency value area a
    // cursor on the separator resolves to the token that follows
    if context::classify(text, to_core_pos(pos)) == Some(CursorContext::TaskDependencyList) {
        if let Some(ident) = scan::identifier_at(line, pos.character)
            .or_else(|| scan::identifier_after(line, pos.character))
        {
            let target = facts::find_task_definition(text, &ident.text)?;
            let origin = Range::new(
                Position::new(pos.line, ident.start),
                Position::new(pos.line, ident.end),
            );
            return Some(vec![link(uri.clone(), origin, target)]);
        }
    }

    None
}

/// Find-references. Anchors and aliases form one set reachable from either
/// end; task keys pair the definition with every usage.
pub fn references(text: &str, pos: Position, uri: &Url, include_declaration: bool) -> Vec<Location> {
    let Some(line) = line_at(text, pos.line) else {
        return Vec::new();
    };
    let loc = |span: Span| Location::new(uri.clone(), to_lsp_range(span));

    if let Some(token) = scan::anchor_at(line, pos.character).or_else(|| scan::alias_at(line, pos.character)) {
        let mut out = Vec::new();
        if include_declaration {
            if let Some(anchor) = facts::find_anchor(text, &token.text) {
                out.push(loc(anchor));
            }
        }
        out.extend(facts::find_aliases(text, &token.text).into_iter().map(loc));
        return out;
    }

    if let Some(ident) = scan::task_key_definition_at(line, pos.character)
        .or_else(|| scan::identifier_at(line, pos.character))
    {
        let definition = facts::find_task_definition(text, &ident.text);
        let usages = facts::find_task_usages(text, &ident.text);
        if definition.is_none() && usages.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::new();
        if include_declaration {
            if let Some(span) = definition {
                out.push(loc(span));
            }
        }
        out.extend(usages.into_iter().map(loc));
        return out;
    }

    Vec::new()
}
