//! Column arithmetic and quote-aware bracket accounting.
//!
//! Cursor columns arrive as UTF-16 code units while regex matches come back
//! as byte offsets; every scanner converts through the helpers here so the
//! two never mix.

/// Byte offset of the UTF-16 column `col` within `line`, clamped to the end
/// of the line. A column landing inside a surrogate pair snaps forward to the
/// next character boundary.
pub fn byte_of_col(line: &str, col: u32) -> usize {
    let target = col as usize;
    let mut units = 0usize;
    for (idx, ch) in line.char_indices() {
        if units >= target {
            return idx;
        }
        units += ch.len_utf16();
    }
    line.len()
}

/// UTF-16 column of the byte offset `byte` within `line`. Offsets past the
/// end of the line are clamped.
pub fn col_of_byte(line: &str, byte: usize) -> u32 {
    let end = byte.min(line.len());
    let prefix = line.get(..end).unwrap_or(line);
    prefix.chars().map(|c| c.len_utf16() as u32).sum()
}

/// Leading-whitespace width of a line, in characters.
pub fn indent_of(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}

/// Net `[` minus `]` count over `s`. Brackets inside single- or double-quoted
/// spans are not counted; an unpaired quote quotes the rest of the line.
pub fn bracket_delta(s: &str) -> i32 {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    for ch in s.chars() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' => quote = Some(ch),
                '[' => depth += 1,
                ']' => depth -= 1,
                _ => {}
            },
        }
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_of_col_ascii_and_clamp() {
        assert_eq!(byte_of_col("abc", 0), 0);
        assert_eq!(byte_of_col("abc", 2), 2);
        assert_eq!(byte_of_col("abc", 9), 3);
        assert_eq!(byte_of_col("", 5), 0);
    }

    #[test]
    fn byte_of_col_wide_chars() {
        // "日" is one char, 3 bytes, 1 UTF-16 unit; "𝄞" is 4 bytes, 2 units.
        let line = "日𝄞x";
        assert_eq!(byte_of_col(line, 1), 3);
        assert_eq!(byte_of_col(line, 3), 7);
        assert_eq!(col_of_byte(line, 7), 3);
        assert_eq!(col_of_byte(line, 3), 1);
    }

    #[test]
    fn bracket_delta_counts_outside_quotes_only() {
        assert_eq!(bracket_delta("use: [a, b"), 1);
        assert_eq!(bracket_delta("use: [a, b]"), 0);
        assert_eq!(bracket_delta("run: 'echo [hi]'"), 0);
        assert_eq!(bracket_delta("x: \"[[\" ["), 1);
        // unpaired quote swallows the rest of the line
        assert_eq!(bracket_delta("x: '[ and more ["), 0);
    }

    #[test]
    fn indent_of_counts_leading_whitespace() {
        assert_eq!(indent_of("    a"), 4);
        assert_eq!(indent_of("\t b"), 2);
        assert_eq!(indent_of(""), 0);
    }
}
