//! Rope/LSP position mapping.
//!
//! Wire positions count UTF-16 code units; ropey indexes scalar values. The
//! conversion clamps out-of-range positions instead of failing, since change
//! events from mid-edit buffers can be momentarily inconsistent.

use ropey::Rope;
use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent};

/// Rope char index of an LSP position, clamped to the end of its line.
pub(crate) fn char_index_at(text: &Rope, pos: Position) -> usize {
    let line_idx = pos.line as usize;
    if line_idx >= text.len_lines() {
        return text.len_chars();
    }
    let line_start = text.line_to_char(line_idx);
    let target = pos.character as usize;

    let mut units = 0usize;
    let mut chars = 0usize;
    for ch in text.line(line_idx).chars() {
        if units >= target {
            break;
        }
        units += ch.len_utf16();
        chars += 1;
    }
    line_start + chars
}

/// Apply one LSP change to the rope: ranged changes splice, rangeless changes
/// replace the whole buffer.
pub(crate) fn apply_change(text: &mut Rope, change: &TextDocumentContentChangeEvent) {
    let Some(range) = &change.range else {
        *text = Rope::from_str(&change.text);
        return;
    };
    let start = char_index_at(text, range.start);
    let end = char_index_at(text, range.end);
    let (start, end) = if start <= end { (start, end) } else { (end, start) };
    if start != end {
        text.remove(start..end);
    }
    if !change.text.is_empty() {
        text.insert(start, &change.text);
    }
}
