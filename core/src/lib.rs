//! Position-context resolution engine for taskflow workflow documents.
//!
//! Everything here works on plain text plus a cursor position. Workflow
//! buffers are routinely mid-edit and syntactically incomplete, so the engine
//! leans on line scanning and regular expressions rather than a syntax tree,
//! and never panics on malformed input. The structural YAML parser is only
//! consulted for facts that need a whole-document view (task-key
//! enumeration), after [`repair`] has made the buffer parseable.

pub mod context;
pub mod facts;
pub mod parse;
pub mod repair;
pub mod scan;
pub mod text;

use once_cell::sync::Lazy;
use regex::Regex;

/// Task-level keywords that start a field inside a task entry. A line
/// beginning a list item with one of these bounds every backward scan.
pub const TASK_KEYWORDS: [&str; 5] = ["key", "call", "use", "run", "with"];

/// Zero-based position; `character` counts UTF-16 code units, as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    pub line: u32,
    pub character: u32,
}

impl Pos {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Half-open span between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    /// Span covering `[start_col, end_col)` on a single line.
    pub fn on_line(line: u32, start_col: u32, end_col: u32) -> Self {
        Self {
            start: Pos::new(line, start_col),
            end: Pos::new(line, end_col),
        }
    }

    /// Inclusive containment; a cursor sitting on either edge counts.
    pub fn contains(&self, pos: Pos) -> bool {
        if pos.line < self.start.line || pos.line > self.end.line {
            return false;
        }
        if pos.line == self.start.line && pos.character < self.start.character {
            return false;
        }
        if pos.line == self.end.line && pos.character > self.end.character {
            return false;
        }
        true
    }
}

// A line that begins a new list item or field with a task-level keyword.
pub(crate) static KEYWORD_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*-?\s*(?:key|call|use|run|with):").expect("keyword line regex"));

// The opener of a bracketed dependency list.
pub(crate) static USE_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)use:\s*\[").expect("use opener regex"));
