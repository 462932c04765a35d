//! Fact extractors: once the cursor's zone is known, pull the structured data
//! needed to answer the request.
//!
//! Everything except task-key enumeration works off the raw line text, so
//! column offsets always refer to the original (unrepaired) buffer.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::{bracket_delta, col_of_byte, indent_of};
use crate::{parse, repair, scan, Pos, Span, KEYWORD_LINE_RE, USE_OPEN_RE};

static KEY_DEF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*-?\s*key:\s*["']?([A-Za-z0-9_-]+)["']?\s*$"#).expect("key def regex"));
static USE_SIMPLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:^|\s)use:\s*["']?([A-Za-z0-9_-]+)["']?\s*$"#).expect("use simple regex"));
static ALIAS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([A-Za-z0-9_-]+)").expect("alias regex"));
static ANCHOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"&([A-Za-z0-9_-]+)").expect("anchor regex"));
static PKG_CALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)call:\s+(\S+)\s+(\S+)\s*$").expect("package call regex"));
static EMBED_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)call:\s*\$\{\{\s*rundir\s*\}\}/(\S+)").expect("embed path regex"));
static DASH_ITEM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*-\s").expect("dash item regex"));

/// A package call found in the document, with the span of its version token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub name: String,
    pub version: String,
    pub line: u32,
    pub version_span: Span,
}

/// Every declared task key, in declaration order. The buffer is speculatively
/// repaired around `cursor` (when given) before the structural parser runs.
/// Empty keys and placeholder keys are excluded; an unparseable document
/// yields an empty list rather than an error.
pub fn task_keys(text: &str, cursor: Option<Pos>) -> Vec<String> {
    let repaired;
    let source = match cursor {
        Some(pos) => {
            repaired = repair::close_open_list(text, pos);
            repaired.as_str()
        }
        None => text,
    };
    match parse::parse_document(source) {
        Ok(doc) => doc
            .tasks
            .into_iter()
            .filter_map(|t| t.key)
            .filter(|k| !k.trim().is_empty() && !k.contains("${{"))
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// First definition site of a task key, by exact match with quotes stripped.
pub fn find_task_definition(text: &str, name: &str) -> Option<Span> {
    for (i, line) in text.lines().enumerate() {
        if let Some(caps) = KEY_DEF_RE.captures(line) {
            let m = caps.get(1)?;
            if m.as_str() == name {
                return Some(Span::on_line(
                    i as u32,
                    col_of_byte(line, m.start()),
                    col_of_byte(line, m.end()),
                ));
            }
        }
    }
    None
}

/// Every usage of a task key: simple `use: name` lines plus items of
/// bracketed lists, single- or multi-line. Columns refer to the original
/// text.
pub fn find_task_usages(text: &str, name: &str) -> Vec<Span> {
    let mut out = Vec::new();
    let mut list_depth = 0i32;
    for (i, line) in text.lines().enumerate() {
        if list_depth > 0 && KEYWORD_LINE_RE.is_match(line) {
            // a new task-level field bounds a dangling list
            list_depth = 0;
        }
        if list_depth > 0 {
            push_list_items(line, 0, name, i as u32, &mut out);
            list_depth += bracket_delta(line);
            continue;
        }
        if let Some(caps) = USE_SIMPLE_RE.captures(line) {
            if let Some(m) = caps.get(1) {
                if m.as_str() == name {
                    out.push(Span::on_line(
                        i as u32,
                        col_of_byte(line, m.start()),
                        col_of_byte(line, m.end()),
                    ));
                }
            }
            continue;
        }
        if let Some(open) = USE_OPEN_RE.find(line) {
            push_list_items(line, open.end(), name, i as u32, &mut out);
            list_depth = bracket_delta(&line[open.end() - 1..]);
        }
    }
    out
}

// Split a list slice on commas; each item is trimmed of whitespace,
// surrounding quotes, and bracket characters before comparison.
fn push_list_items(line: &str, from: usize, name: &str, line_no: u32, out: &mut Vec<Span>) {
    let mut offset = from;
    for piece in line[from..].split(',') {
        let token = piece
            .trim()
            .trim_matches(|c| c == '\'' || c == '"' || c == '[' || c == ']')
            .trim();
        if token == name {
            if let Some(local) = piece.find(token) {
                let start = offset + local;
                out.push(Span::on_line(
                    line_no,
                    col_of_byte(line, start),
                    col_of_byte(line, start + token.len()),
                ));
            }
        }
        offset += piece.len() + 1;
    }
}

/// The sole declaration site of an anchor, span including the `&` sigil.
pub fn find_anchor(text: &str, name: &str) -> Option<Span> {
    for (i, line) in text.lines().enumerate() {
        for caps in ANCHOR_RE.captures_iter(line) {
            if caps.get(1).map(|m| m.as_str()) == Some(name) {
                let whole = caps.get(0)?;
                return Some(Span::on_line(
                    i as u32,
                    col_of_byte(line, whole.start()),
                    col_of_byte(line, whole.end()),
                ));
            }
        }
    }
    None
}

/// Every alias occurrence of `name`, spans including the `*` sigil. The regex
/// is greedy, so `*name` immediately followed by another identifier character
/// never matches a shorter name.
pub fn find_aliases(text: &str, name: &str) -> Vec<Span> {
    let mut out = Vec::new();
    for (i, line) in text.lines().enumerate() {
        for caps in ALIAS_RE.captures_iter(line) {
            if caps.get(1).map(|m| m.as_str()) != Some(name) {
                continue;
            }
            if let Some(whole) = caps.get(0) {
                out.push(Span::on_line(
                    i as u32,
                    col_of_byte(line, whole.start()),
                    col_of_byte(line, whole.end()),
                ));
            }
        }
    }
    out
}

/// The content an anchor stands for, for hover display. Inline content wins;
/// otherwise the indented block below the anchor line is collected and
/// re-based. An anchor with no content yields a placeholder naming it.
pub fn anchor_content(text: &str, name: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    let span = find_anchor(text, name)?;
    let line = lines[span.start.line as usize];
    let after = &line[crate::text::byte_of_col(line, span.end.character)..];
    let inline = after.trim();
    if !inline.is_empty() {
        return Some(inline.to_string());
    }

    let base = indent_of(line);
    let drop = base + 2;
    let mut collected = Vec::new();
    for l in lines.iter().skip(span.start.line as usize + 1) {
        if l.trim().is_empty() {
            continue;
        }
        if indent_of(l) <= base {
            break;
        }
        let cut = l
            .char_indices()
            .take_while(|(i, c)| *i < drop && (*c == ' ' || *c == '\t'))
            .count();
        collected.push(&l[cut..]);
    }
    if collected.is_empty() {
        return Some(format!("&{name}"));
    }
    Some(collected.join("\n"))
}

/// `(name, version)` of a package call on one line. Lines carrying a
/// placeholder expression are embedded-file references, never package calls.
pub fn package_call_on_line(line: &str) -> Option<(String, String)> {
    if line.contains("${{") {
        return None;
    }
    let caps = PKG_CALL_RE.captures(line)?;
    Some((caps.get(1)?.as_str().to_string(), caps.get(2)?.as_str().to_string()))
}

/// The relative path of an embedded-file reference on one line, with its
/// on-screen span for highlighting and navigation.
pub fn embedded_path_on_line(line: &str, line_no: u32) -> Option<(String, Span)> {
    let caps = EMBED_PATH_RE.captures(line)?;
    let m = caps.get(1)?;
    let span = Span::on_line(line_no, col_of_byte(line, m.start()), col_of_byte(line, m.end()));
    Some((m.as_str().trim().to_string(), span))
}

/// Every package call in the document with the span of its version token.
/// The version column comes from a last-index-of search so an earlier
/// occurrence of the same digits on the line is never matched.
pub fn call_sites(text: &str) -> Vec<CallSite> {
    let mut out = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let Some((name, version)) = package_call_on_line(line) else {
            continue;
        };
        let Some(at) = line.rfind(&version) else {
            continue;
        };
        out.push(CallSite {
            version_span: Span::on_line(i as u32, col_of_byte(line, at), col_of_byte(line, at + version.len())),
            name,
            version,
            line: i as u32,
        });
    }
    out
}

/// The package call enclosing a parameter block: the nearest `call:` line at
/// or above `pos` within the same task entry.
pub fn enclosing_package_call(text: &str, pos: Pos) -> Option<(String, String)> {
    let lines: Vec<&str> = text.lines().collect();
    let last = (pos.line as usize).min(lines.len().saturating_sub(1));
    for j in (0..=last).rev() {
        let line = lines.get(j)?;
        if let Some(found) = package_call_on_line(line) {
            return Some(found);
        }
        if DASH_ITEM_RE.is_match(line) {
            // crossed the start of the task entry
            return None;
        }
    }
    None
}
