//! Context classifiers: decide which semantic zone of the grammar contains
//! the cursor.
//!
//! [`classify`] evaluates the classifiers in a fixed priority order with
//! early return: dependency-list, then embedded-file-path, then package-call,
//! then parameter-block. The order is a contract, not an artifact: `call:`
//! alone is ambiguous between a package call and an embedded file reference,
//! and only the placeholder check tells them apart.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::{bracket_delta, byte_of_col, indent_of};
use crate::{Pos, KEYWORD_LINE_RE, USE_OPEN_RE};

// `use:` typed, value area open, no bracket involved yet.
static USE_TAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)use:\s*[^\[\]]*$").expect("use tail regex"));
// `call: ${{ rundir }}` optionally followed by `/partial/path`.
static EMBED_TAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)call:\s*\$\{\{\s*rundir\s*\}\}(?:/(\S*))?$").expect("embed tail regex"));
// `call: ` with a partially typed bare value (no placeholder started).
static CALL_TAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)call:\s*[^\s{}]*$").expect("call tail regex"));
// An empty `with:` declaration line.
static WITH_EMPTY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*-?\s*with:\s*$").expect("with line regex"));

/// The semantic zone occupied by the cursor. Exactly one applies per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorContext {
    /// Inside a `use:` dependency list, single-line or bracketed multi-line.
    TaskDependencyList,
    /// After `call: ${{ rundir }}/`, carrying the partial path typed so far.
    EmbeddedFilePath { partial: String },
    /// After `call:` with a bare (non-placeholder) value.
    PackageCall,
    /// On an empty `with:` line or indented under one.
    ParameterBlock,
}

/// Classify the zone at `pos`, or `None` when no classifier matches; callers
/// answer with the request kind's "no result" value in that case.
pub fn classify(text: &str, pos: Pos) -> Option<CursorContext> {
    if in_dependency_list(text, pos) {
        return Some(CursorContext::TaskDependencyList);
    }
    if let Some(partial) = embedded_file_partial(text, pos) {
        return Some(CursorContext::EmbeddedFilePath { partial });
    }
    if in_package_call(text, pos) {
        return Some(CursorContext::PackageCall);
    }
    if in_parameter_block(text, pos) {
        return Some(CursorContext::ParameterBlock);
    }
    None
}

fn line_prefix(lines: &[&str], pos: Pos) -> Option<String> {
    let line = *lines.get(pos.line as usize)?;
    let cut = byte_of_col(line, pos.character);
    Some(line[..cut].to_string())
}

/// True when the cursor follows a `use:` keyword with no bracket opened yet,
/// or lies inside a still-open bracketed list introduced by `use: [` on the
/// current or an earlier line.
pub fn in_dependency_list(text: &str, pos: Pos) -> bool {
    let lines: Vec<&str> = text.lines().collect();
    let Some(prefix) = line_prefix(&lines, pos) else {
        return false;
    };

    if USE_TAIL_RE.is_match(&prefix) {
        return true;
    }

    // Bracket-depth accounting, seeded from the part of the cursor line left
    // of the cursor, then walked backward one whole line at a time. The walk
    // is bounded by the first line that starts another task-level field.
    let mut depth = bracket_delta(&prefix);
    if depth > 0 && USE_OPEN_RE.is_match(&prefix) {
        return true;
    }
    for j in (0..pos.line as usize).rev() {
        let line = lines[j];
        depth += bracket_delta(line);
        if depth > 0 && USE_OPEN_RE.is_match(line) {
            return true;
        }
        if KEYWORD_LINE_RE.is_match(line) {
            return false;
        }
    }
    false
}

/// The partial relative path (possibly empty) when the cursor sits after a
/// `call: ${{ rundir }}` reference.
pub fn embedded_file_partial(text: &str, pos: Pos) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    let prefix = line_prefix(&lines, pos)?;
    let caps = EMBED_TAIL_RE.captures(&prefix)?;
    Some(caps.get(1).map(|m| m.as_str()).unwrap_or("").to_string())
}

/// True when the cursor follows `call:` with a bare value. The embedded-file
/// check runs first in [`classify`] and excludes placeholder values here.
pub fn in_package_call(text: &str, pos: Pos) -> bool {
    let lines: Vec<&str> = text.lines().collect();
    let Some(prefix) = line_prefix(&lines, pos) else {
        return false;
    };
    CALL_TAIL_RE.is_match(&prefix)
}

/// True on an empty `with:` line, or on a line indented under one. Resolved
/// by walking backward past equal-or-deeper lines; the first strictly
/// shallower line decides.
pub fn in_parameter_block(text: &str, pos: Pos) -> bool {
    let lines: Vec<&str> = text.lines().collect();
    let Some(&line) = lines.get(pos.line as usize) else {
        return false;
    };
    if WITH_EMPTY_RE.is_match(line) {
        return true;
    }

    // A blank line has no indentation of its own; the cursor column stands in.
    let cur_indent = if line.trim().is_empty() {
        pos.character as usize
    } else {
        indent_of(line)
    };
    if cur_indent == 0 {
        return false;
    }

    for j in (0..pos.line as usize).rev() {
        let above = lines[j];
        if above.trim().is_empty() {
            continue;
        }
        if indent_of(above) >= cur_indent {
            continue;
        }
        return WITH_EMPTY_RE.is_match(above);
    }
    false
}
