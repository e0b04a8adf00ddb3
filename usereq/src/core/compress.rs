//! Comment and blank-line stripping for compact source listings.
//!
//! Indentation survives only for languages where it carries meaning. A
//! shebang on the first line is the one comment that is kept.

use super::languages::{Language, LanguageSpec};
use super::lexing::{find_comment, in_string_context};

const PY_QUOTES: [&str; 2] = ["\"\"\"", "'''"];

enum Open {
    Code,
    Block,
    Docstring(&'static str),
}

/// Compress `source`, optionally prefixing each kept line with `<n>: `.
pub fn compress_source(source: &str, lang: Language, line_numbers: bool) -> String {
    let spec = lang.spec();
    let mut lines: Vec<String> = source.split('\n').map(str::to_string).collect();
    let mut kept: Vec<(usize, String)> = Vec::new();
    let mut open = Open::Code;
    let is_python = lang == Language::Python;

    let mut i = 0;
    while i < lines.len() {
        match open {
            Open::Block => {
                if let Some(end) = spec.multi_comment_end()
                    && let Some(pos) = lines[i].find(end)
                {
                    let remainder = lines[i][pos + end.len()..].to_string();
                    open = Open::Code;
                    if !remainder.trim().is_empty() {
                        lines[i] = remainder;
                        continue;
                    }
                }
                i += 1;
                continue;
            }
            Open::Docstring(quote) => {
                if let Some(pos) = lines[i].find(quote) {
                    let remainder = lines[i][pos + quote.len()..].to_string();
                    open = Open::Code;
                    if !remainder.trim().is_empty() {
                        lines[i] = remainder;
                        continue;
                    }
                }
                i += 1;
                continue;
            }
            Open::Code => {}
        }

        let original = lines[i].clone();
        let stripped = original.trim();
        if stripped.is_empty() {
            i += 1;
            continue;
        }

        let mut line = original.clone();
        if is_python {
            match python_docstring(stripped) {
                Docstring::Whole => {
                    i += 1;
                    continue;
                }
                Docstring::Opens(quote) => {
                    open = Open::Docstring(quote);
                    i += 1;
                    continue;
                }
                Docstring::None => {}
            }
        } else if let Some((start, end)) = spec.multi_comment
            && let Some(pos) = line.find(start)
            && !in_string_context(&line, pos, &spec.string_delimiters)
        {
            let after = &line[pos + start.len()..];
            match after.find(end) {
                Some(close) if start != end => {
                    let rebuilt = format!("{}{}", &line[..pos], &after[close + end.len()..]);
                    if rebuilt.trim().is_empty() {
                        i += 1;
                    } else {
                        lines[i] = rebuilt;
                    }
                    continue;
                }
                _ => {
                    let before = line[..pos].to_string();
                    open = Open::Block;
                    if before.trim().is_empty() {
                        i += 1;
                        continue;
                    }
                    line = before;
                }
            }
        }

        if let Some(marker) = spec.single_comment
            && stripped.starts_with(marker)
        {
            if i == 0 && stripped.starts_with("#!") {
                kept.push((i + 1, stripped.to_string()));
            }
            i += 1;
            continue;
        }

        if let Some(marker) = spec.single_comment {
            line = strip_inline_comment(&line, marker, spec);
        }

        let cleaned = if lang.is_indent_significant() {
            line.trim_end().to_string()
        } else {
            line.trim().to_string()
        };
        if !cleaned.trim().is_empty() {
            kept.push((i + 1, cleaned));
        }
        i += 1;
    }

    kept.iter()
        .map(|(number, text)| {
            if line_numbers {
                format!("{number}: {text}")
            } else {
                text.clone()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

enum Docstring {
    None,
    Whole,
    Opens(&'static str),
}

/// Only docstrings that start the line are dropped; assigned strings stay.
fn python_docstring(stripped: &str) -> Docstring {
    for quote in PY_QUOTES {
        if !stripped.starts_with(quote) {
            continue;
        }
        let count = stripped.matches(quote).count();
        if count >= 2 && stripped.ends_with(quote) && stripped.len() > quote.len() {
            return Docstring::Whole;
        }
        if count == 1 {
            return Docstring::Opens(quote);
        }
    }
    Docstring::None
}

fn strip_inline_comment(line: &str, marker: &str, spec: &LanguageSpec) -> String {
    match find_comment(line, marker, &spec.string_delimiters) {
        Some(pos) => line[..pos].to_string(),
        None => line.to_string(),
    }
}
