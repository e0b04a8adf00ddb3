//! String-aware scanning shared by the analyzer and the compressor.
//!
//! Positions are byte offsets and always land on char boundaries.

/// Split source text into lines without their `\n`/`\r` terminators.
pub fn split_lines(source: &str) -> Vec<&str> {
    source
        .split_inclusive('\n')
        .map(|line| line.trim_end_matches(['\n', '\r']))
        .collect()
}

/// Number of bytes of leading whitespace.
pub fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn char_len(rest: &str) -> usize {
    rest.chars().next().map_or(1, char::len_utf8)
}

/// True when byte offset `pos` falls inside a string literal.
///
/// `delimiters` must be ordered longest first. A backslash inside a string
/// skips the following character.
pub fn in_string_context(line: &str, pos: usize, delimiters: &[&str]) -> bool {
    let mut current: Option<&str> = None;
    let mut i = 0;
    while i < pos && i < line.len() {
        let rest = &line[i..];
        match current {
            Some(delim) => {
                if rest.starts_with('\\') && rest.len() > 1 {
                    i += 1 + char_len(&rest[1..]);
                    continue;
                }
                if rest.starts_with(delim) {
                    current = None;
                    i += delim.len();
                    continue;
                }
            }
            None => {
                if let Some(delim) = delimiters.iter().find(|d| rest.starts_with(**d)) {
                    current = Some(delim);
                    i += delim.len();
                    continue;
                }
            }
        }
        i += char_len(rest);
    }
    current.is_some()
}

/// Byte offset of the first `marker` outside string literals.
pub fn find_comment(line: &str, marker: &str, delimiters: &[&str]) -> Option<usize> {
    let mut current: Option<&str> = None;
    let mut i = 0;
    while i < line.len() {
        let rest = &line[i..];
        match current {
            Some(delim) => {
                if rest.starts_with('\\') && rest.len() > 1 {
                    i += 1 + char_len(&rest[1..]);
                    continue;
                }
                if rest.starts_with(delim) {
                    current = None;
                    i += delim.len();
                    continue;
                }
            }
            None => {
                if rest.starts_with(marker) {
                    return Some(i);
                }
                if let Some(delim) = delimiters.iter().find(|d| rest.starts_with(**d)) {
                    current = Some(delim);
                    i += delim.len();
                    continue;
                }
            }
        }
        i += char_len(rest);
    }
    None
}

/// Keep at most `max` characters, replacing the tail with `...` when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUOTES: &[&str] = &["\"", "'"];

    #[test]
    fn comment_marker_inside_string_is_ignored() {
        let line = r#"let url = "http://x"; // real"#;
        assert_eq!(find_comment(line, "//", QUOTES), Some(22));
    }

    #[test]
    fn escaped_quote_keeps_string_open() {
        let line = r##"s = "a\"#b" # tail"##;
        assert_eq!(find_comment(line, "#", QUOTES), Some(12));
    }

    #[test]
    fn string_context_tracks_open_literal() {
        let line = "x = 'abc /* not a comment'";
        let pos = line.find("/*").expect("marker");
        assert!(in_string_context(line, pos, QUOTES));
        assert!(!in_string_context("/* real */", 0, QUOTES));
    }

    #[test]
    fn multibyte_text_does_not_split_chars() {
        let line = "名前 = \"値\" # コメント";
        let idx = find_comment(line, "#", QUOTES).expect("comment");
        assert!(line[idx..].starts_with('#'));
    }

    #[test]
    fn split_lines_drops_terminators() {
        assert_eq!(split_lines("a\r\nb\n\nc"), vec!["a", "b", "", "c"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate_chars("abcdef", 6), "abcdef");
        assert_eq!(truncate_chars("abcdefg", 6), "abc...");
    }
}
