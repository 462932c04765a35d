//! Speculative repair: make a mid-edit buffer parseable without touching
//! anything the author already typed.
//!
//! The structural parser wants complete YAML, but completion fires while a
//! bracketed `use: [` list is still open. The only permitted transformation
//! is inserting a closing bracket at or after the cursor line; positions of
//! existing content are preserved exactly.

use crate::text::{bracket_delta, byte_of_col, indent_of};
use crate::{Pos, KEYWORD_LINE_RE, USE_OPEN_RE};

/// Close an unterminated `use: [` list at the cursor, returning the repaired
/// text. Returns the input unchanged when no open list is found or the list
/// is already closed.
pub fn close_open_list(text: &str, pos: Pos) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let Some(&line) = lines.get(pos.line as usize) else {
        return text.to_string();
    };

    if USE_OPEN_RE.is_match(line) {
        // Opener on the cursor line: either the closer is already there, or
        // one bracket appended to this same line settles it.
        if bracket_delta(line) <= 0 {
            return text.to_string();
        }
        return rebuild(text, &lines, |out| {
            out[pos.line as usize].push(']');
        });
    }

    // A list opened on an earlier line, still open at the cursor. Same
    // backward depth accounting as the dependency-list classifier.
    let cut = byte_of_col(line, pos.character);
    let mut depth = bracket_delta(&line[..cut]);
    let mut opener: Option<usize> = None;
    for j in (0..pos.line as usize).rev() {
        depth += bracket_delta(lines[j]);
        if depth > 0 && USE_OPEN_RE.is_match(lines[j]) {
            opener = Some(j);
            break;
        }
        if KEYWORD_LINE_RE.is_match(lines[j]) {
            break;
        }
    }
    let Some(opener) = opener else {
        return text.to_string();
    };

    // A closer may already sit below the cursor, before the next task-level
    // field bounds the list's scope.
    let mut ahead = 0i32;
    for l in lines.iter().skip(pos.line as usize + 1) {
        if KEYWORD_LINE_RE.is_match(l) {
            break;
        }
        ahead += bracket_delta(l);
        if ahead < 0 {
            return text.to_string();
        }
    }

    let closer = format!("{}]", " ".repeat(indent_of(lines[opener])));
    rebuild(text, &lines, |out| {
        out.insert(pos.line as usize + 1, closer.clone());
    })
}

fn rebuild(text: &str, lines: &[&str], edit: impl Fn(&mut Vec<String>)) -> String {
    let mut out: Vec<String> = lines.iter().map(|s| s.to_string()).collect();
    edit(&mut out);
    let mut repaired = out.join("\n");
    if text.ends_with('\n') {
        repaired.push('\n');
    }
    repaired
}
