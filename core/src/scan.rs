//! Lexical scanners: each recognizes a single token pattern on one line and
//! returns the smallest span of that kind containing the cursor column.
//!
//! All scanners are total functions over `(line, character)`; empty or
//! malformed lines simply yield `None`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::col_of_byte;

static IDENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9_-]+").expect("ident regex"));
static ALIAS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([A-Za-z0-9_-]+)").expect("alias regex"));
static ANCHOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"&([A-Za-z0-9_-]+)").expect("anchor regex"));
static KEY_DEF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*-?\s*key:\s*["']?([A-Za-z0-9_-]+)["']?\s*$"#).expect("key def regex"));

/// A token found on a single line, with UTF-16 column bounds. For sigiled
/// tokens (`*alias`, `&anchor`) the span includes the sigil while `text`
/// carries only the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAt {
    pub text: String,
    pub start: u32,
    pub end: u32,
}

fn touches(start: u32, end: u32, character: u32) -> bool {
    start <= character && character <= end
}

/// Longest `[a-zA-Z0-9_-]` run touching the cursor column. Runs made of only
/// hyphens and underscores are rejected.
pub fn identifier_at(line: &str, character: u32) -> Option<TokenAt> {
    for m in IDENT_RE.find_iter(line) {
        let start = col_of_byte(line, m.start());
        let end = col_of_byte(line, m.end());
        if !touches(start, end, character) {
            continue;
        }
        if !m.as_str().chars().any(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        return Some(TokenAt {
            text: m.as_str().to_string(),
            start,
            end,
        });
    }
    None
}

/// First identifier starting at or after the cursor column. Lets a cursor in
/// the whitespace of a keyword's value area resolve to the token that
/// follows it.
pub fn identifier_after(line: &str, character: u32) -> Option<TokenAt> {
    for m in IDENT_RE.find_iter(line) {
        let start = col_of_byte(line, m.start());
        if start < character {
            continue;
        }
        if !m.as_str().chars().any(|c| c.is_ascii_alphanumeric()) {
            continue;
        }
        return Some(TokenAt {
            text: m.as_str().to_string(),
            start,
            end: col_of_byte(line, m.end()),
        });
    }
    None
}

/// A `*name` alias occurrence whose span (sigil included) contains the cursor.
pub fn alias_at(line: &str, character: u32) -> Option<TokenAt> {
    sigiled_at(&ALIAS_RE, line, character)
}

/// A `&name` anchor occurrence whose span (sigil included) contains the cursor.
pub fn anchor_at(line: &str, character: u32) -> Option<TokenAt> {
    sigiled_at(&ANCHOR_RE, line, character)
}

fn sigiled_at(re: &Regex, line: &str, character: u32) -> Option<TokenAt> {
    for caps in re.captures_iter(line) {
        let whole = caps.get(0)?;
        let start = col_of_byte(line, whole.start());
        let end = col_of_byte(line, whole.end());
        if touches(start, end, character) {
            return Some(TokenAt {
                text: caps.get(1)?.as_str().to_string(),
                start,
                end,
            });
        }
    }
    None
}

/// The identifier of a task-key definition line (`- key: name`, quotes
/// optional), returned only when the cursor falls within the identifier span.
pub fn task_key_definition_at(line: &str, character: u32) -> Option<TokenAt> {
    let caps = KEY_DEF_RE.captures(line)?;
    let m = caps.get(1)?;
    let start = col_of_byte(line, m.start());
    let end = col_of_byte(line, m.end());
    if !touches(start, end, character) {
        return None;
    }
    Some(TokenAt {
        text: m.as_str().to_string(),
        start,
        end,
    })
}
