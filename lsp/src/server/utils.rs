use tower_lsp::lsp_types::{Position, Range, Url};

use taskflow_core::{Pos, Span};

/// Only documents inside one of the recognized workflow directories are
/// served; everything else gets the "no result" response for every request
/// kind so a generic YAML tool can still act.
pub const WORKFLOW_DIRS: [&str; 2] = ["taskflows", "flows"];

/// True when any path segment equals a recognized workflow directory name.
/// Mixed `/` and `\` separators are tolerated.
pub fn path_is_workflow(path: &str) -> bool {
    path.replace('\\', "/")
        .split('/')
        .any(|segment| WORKFLOW_DIRS.contains(&segment))
}

pub fn is_workflow_uri(uri: &Url) -> bool {
    path_is_workflow(uri.path())
}

pub fn to_core_pos(pos: Position) -> Pos {
    Pos::new(pos.line, pos.character)
}

pub fn to_lsp_range(span: Span) -> Range {
    Range::new(
        Position::new(span.start.line, span.start.character),
        Position::new(span.end.line, span.end.character),
    )
}
