//! Line-oriented source analyzer.
//!
//! [`analyze`] finds comments and definitions with the per-language regex
//! table; [`enrich`] layers on signatures, parent containers, visibility,
//! inheritance and (given the source lines) body annotations plus doxygen
//! fields.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::doxygen::parse_doxygen_comment;
use super::languages::Language;
use super::lexing::{find_comment, in_string_context, indent_width, split_lines};
use super::types::{BodyComment, ElementType, ExitPoint, SourceElement};

const MAX_EXTRACT_LINES: usize = 5;

static EXIT_EXPLICIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(return\b.*|yield\b.*|raise\b.*|throw\b.*|panic!\(.*)")
        .expect("exit pattern should compile")
});
static EXIT_IMPLICIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(sys\.exit\(.*|os\._exit\(.*|exit\(.*|process\.exit\(.*)")
        .expect("exit pattern should compile")
});
static POSTFIX_DOC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:#|//+|--|/\*+|;+)!?<").expect("postfix pattern should compile")
});

static WORD_PUBLIC: LazyLock<Regex> = LazyLock::new(|| word(r"public"));
static WORD_PRIVATE: LazyLock<Regex> = LazyLock::new(|| word(r"private"));
static WORD_PROTECTED: LazyLock<Regex> = LazyLock::new(|| word(r"protected"));
static WORD_INTERNAL: LazyLock<Regex> = LazyLock::new(|| word(r"internal"));
static WORD_FILEPRIVATE: LazyLock<Regex> = LazyLock::new(|| word(r"fileprivate"));
static WORD_PUBLIC_OR_OPEN: LazyLock<Regex> = LazyLock::new(|| word(r"(?:public|open)"));
static LEADING_PUB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*pub\b").expect("pub pattern should compile"));

static INHERIT_PYTHON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"class\s+\w+\s*\(([^)]+)\)").expect("inheritance pattern should compile")
});
static INHERIT_EXTENDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bextends\s+([\w.<>, ]+)").expect("inheritance pattern should compile")
});
static INHERIT_IMPLEMENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bimplements\s+([\w.<>, ]+)").expect("inheritance pattern should compile")
});
static INHERIT_COLON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:class|struct)\s+\w+\s*:\s*(.+?)(?:\s*\{|$)")
        .expect("inheritance pattern should compile")
});
static INHERIT_KOTLIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"class\s+\w+\s*(?:\([^)]*\))?\s*:\s*(.+?)(?:\s*\{|$)")
        .expect("inheritance pattern should compile")
});
static INHERIT_RUBY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"class\s+\w+\s*<\s*(\w+)").expect("inheritance pattern should compile")
});

fn word(name: &str) -> Regex {
    Regex::new(&format!(r"\b{name}\b")).expect("keyword pattern should compile")
}

/// Find comments and definitions in `source`.
pub fn analyze(source: &str, lang: Language) -> Vec<SourceElement> {
    let spec = lang.spec();
    let delimiters = &spec.string_delimiters;
    let lines = split_lines(source);
    let mut elements = Vec::new();

    let mut in_multi = false;
    let mut multi_start = 0;
    let mut multi_lines: Vec<&str> = Vec::new();

    for (idx, line) in lines.iter().copied().enumerate() {
        let line_num = idx + 1;

        if in_multi {
            multi_lines.push(line);
            if spec.multi_comment_end().is_some_and(|end| line.contains(end)) {
                in_multi = false;
                elements.push(SourceElement::new(
                    ElementType::CommentMulti,
                    multi_start,
                    line_num,
                    cap_extract(&multi_lines),
                    None,
                ));
                multi_lines.clear();
            }
            continue;
        }

        if let Some((start, end)) = spec.multi_comment
            && let Some(start_idx) = line.find(start)
            && !in_string_context(line, start_idx, delimiters)
        {
            let after = &line[start_idx + start.len()..];
            let closes_here = start != end && after.contains(end);
            let docstring_closes_here = is_docstring_marker(start) && after.contains(start);
            if closes_here || docstring_closes_here {
                elements.push(SourceElement::new(
                    ElementType::CommentMulti,
                    line_num,
                    line_num,
                    line.to_string(),
                    None,
                ));
            } else {
                in_multi = true;
                multi_start = line_num;
                multi_lines = vec![line];
            }
            continue;
        }

        if let Some(marker) = spec.single_comment
            && let Some(comment_idx) = find_comment(line, marker, delimiters)
        {
            if line[..comment_idx].trim().is_empty() {
                elements.push(SourceElement::new(
                    ElementType::CommentSingle,
                    line_num,
                    line_num,
                    line.to_string(),
                    None,
                ));
                continue;
            }
            elements.push(SourceElement::new(
                ElementType::CommentSingle,
                line_num,
                line_num,
                line[comment_idx..].to_string(),
                Some("inline".to_string()),
            ));
        }

        if line.trim().is_empty() {
            continue;
        }

        for (element_type, pattern) in &spec.patterns {
            let Some(caps) = pattern.captures(line) else {
                continue;
            };
            let line_end = if element_type.is_single_line() {
                line_num
            } else {
                find_block_end(&lines, idx, lang, line)
            };
            elements.push(SourceElement::new(
                *element_type,
                line_num,
                line_end,
                cap_extract(&lines[idx..line_end.max(line_num)]),
                identifier(&caps),
            ));
            break;
        }
    }

    elements
}

fn is_docstring_marker(marker: &str) -> bool {
    marker == "\"\"\"" || marker == "'''"
}

/// Highest numbered non-empty capture group, trimmed.
fn identifier(caps: &Captures<'_>) -> Option<String> {
    (1..caps.len()).rev().find_map(|group| {
        caps.get(group)
            .map(|m| m.as_str().trim())
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    })
}

fn cap_extract(lines: &[&str]) -> String {
    if lines.len() > MAX_EXTRACT_LINES {
        let mut kept: Vec<&str> = lines[..MAX_EXTRACT_LINES - 1].to_vec();
        kept.push("    ...");
        return kept.join("\n");
    }
    lines.join("\n")
}

/// 1-based last line of the block starting at 0-based `start_idx`.
fn find_block_end(lines: &[&str], start_idx: usize, lang: Language, first_line: &str) -> usize {
    let indent = indent_width(first_line);
    match lang {
        Language::Python => indentation_block_end(lines, start_idx, indent, 200),
        Language::Haskell => indentation_block_end(lines, start_idx, indent, 100),
        Language::C
        | Language::Cpp
        | Language::Rust
        | Language::JavaScript
        | Language::TypeScript
        | Language::Java
        | Language::Go
        | Language::CSharp
        | Language::Swift
        | Language::Kotlin
        | Language::Php
        | Language::Scala
        | Language::Zig => {
            let limit = lines.len().min(start_idx + 300);
            let mut depth: i64 = 0;
            let mut found_open = false;
            let mut end = start_idx;
            while end < limit {
                for ch in lines[end].chars() {
                    match ch {
                        '{' => {
                            depth += 1;
                            found_open = true;
                        }
                        '}' => depth -= 1,
                        _ => {}
                    }
                }
                if found_open && depth <= 0 {
                    return end + 1;
                }
                end += 1;
            }
            if found_open { end } else { start_idx + 1 }
        }
        Language::Ruby | Language::Elixir | Language::Lua => {
            let limit = lines.len().min(start_idx + 200);
            for (end, line) in lines.iter().enumerate().take(limit).skip(start_idx + 1) {
                let trimmed = line.trim();
                if (trimmed == "end" || trimmed.starts_with("end ")) && indent_width(line) <= indent
                {
                    return end + 1;
                }
            }
            start_idx + 1
        }
        _ => start_idx + 1,
    }
}

fn indentation_block_end(lines: &[&str], start_idx: usize, indent: usize, window: usize) -> usize {
    let limit = lines.len().min(start_idx + window);
    let mut end = start_idx + 1;
    while end < limit {
        let line = lines[end];
        if !line.trim().is_empty() && indent_width(line) <= indent {
            break;
        }
        end += 1;
    }
    end
}

/// Add signatures, hierarchy, visibility and inheritance to analyzed elements.
///
/// When `source_lines` is given, body comments, exit points and doxygen
/// fields are extracted as well.
pub fn enrich(elements: &mut [SourceElement], lang: Language, source_lines: Option<&[&str]>) {
    extract_signatures(elements);
    detect_hierarchy(elements);
    for elem in &mut *elements {
        if elem.element_type.is_comment() || elem.element_type == ElementType::Import {
            continue;
        }
        let sig = elem.first_line().trim().to_string();
        elem.visibility = parse_visibility(&sig, elem.name.as_deref(), lang);
        if matches!(
            elem.element_type,
            ElementType::Class | ElementType::Struct | ElementType::Interface
        ) {
            elem.inherits = parse_inheritance(&sig, lang);
        }
    }
    if let Some(lines) = source_lines {
        extract_body_annotations(elements, lang, lines);
        extract_doxygen_fields(elements);
    }
}

fn extract_signatures(elements: &mut [SourceElement]) {
    for elem in &mut *elements {
        if !elem.element_type.is_definition() {
            continue;
        }
        let first = elem.first_line().trim();
        let mut sig = first;
        if !first.ends_with("::") {
            for suffix in [" {", "{", ":", ";"] {
                if let Some(stripped) = first.strip_suffix(suffix) {
                    sig = stripped.trim_end();
                    break;
                }
            }
        }
        elem.signature = Some(sig.to_string());
    }
}

fn detect_hierarchy(elements: &mut [SourceElement]) {
    let containers: Vec<(usize, usize, Option<String>)> = elements
        .iter()
        .filter(|e| e.element_type.is_container())
        .map(|e| (e.line_start, e.line_end, e.name.clone()))
        .collect();

    for elem in &mut *elements {
        let kind = elem.element_type;
        if kind.is_comment() || kind == ElementType::Import || kind.is_container() {
            continue;
        }
        let mut best: Option<&(usize, usize, Option<String>)> = None;
        for candidate in &containers {
            let (start, end, _) = candidate;
            if *start > elem.line_start || *end < elem.line_end {
                continue;
            }
            best = match best {
                None => Some(candidate),
                Some(current) if *start > current.0 => Some(candidate),
                Some(current) if *start == current.0 && *end < current.1 => Some(candidate),
                keep => keep,
            };
        }
        if let Some((_, _, name)) = best {
            elem.parent_name = name.clone();
            elem.depth = 1;
        }
    }
}

fn parse_visibility(sig: &str, name: Option<&str>, lang: Language) -> Option<String> {
    let vis = match lang {
        Language::Python => {
            if name.is_some_and(|n| n.starts_with('_')) {
                "priv"
            } else {
                "pub"
            }
        }
        Language::Java | Language::CSharp | Language::Kotlin | Language::Php => {
            if WORD_PUBLIC.is_match(sig) {
                "pub"
            } else if WORD_PRIVATE.is_match(sig) {
                "priv"
            } else if WORD_PROTECTED.is_match(sig) {
                "prot"
            } else if WORD_INTERNAL.is_match(sig) {
                "int"
            } else {
                return None;
            }
        }
        Language::Rust | Language::Zig => {
            if LEADING_PUB.is_match(sig) {
                "pub"
            } else {
                "priv"
            }
        }
        Language::Go => {
            let exported = name
                .and_then(|n| n.chars().next())
                .is_some_and(char::is_uppercase);
            if exported { "pub" } else { "priv" }
        }
        Language::Swift => {
            if WORD_PRIVATE.is_match(sig) {
                "priv"
            } else if WORD_FILEPRIVATE.is_match(sig) {
                "fpriv"
            } else if WORD_PUBLIC_OR_OPEN.is_match(sig) {
                "pub"
            } else {
                return None;
            }
        }
        Language::Cpp => {
            if WORD_PUBLIC.is_match(sig) {
                "pub"
            } else if WORD_PRIVATE.is_match(sig) {
                "priv"
            } else if WORD_PROTECTED.is_match(sig) {
                "prot"
            } else {
                return None;
            }
        }
        _ => return None,
    };
    Some(vis.to_string())
}

fn first_group(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

fn parse_inheritance(first_line: &str, lang: Language) -> Option<String> {
    match lang {
        Language::Python => first_group(&INHERIT_PYTHON, first_line),
        Language::Java | Language::TypeScript | Language::JavaScript => {
            let parts: Vec<String> = [&*INHERIT_EXTENDS, &*INHERIT_IMPLEMENTS]
                .into_iter()
                .filter_map(|re| first_group(re, first_line))
                .collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Language::Cpp | Language::CSharp | Language::Swift => {
            first_group(&INHERIT_COLON, first_line)
        }
        Language::Kotlin => first_group(&INHERIT_KOTLIN, first_line),
        Language::Ruby => first_group(&INHERIT_RUBY, first_line),
        _ => None,
    }
}

/// Strip one leading comment marker plus surrounding quote/star noise.
pub fn clean_comment_line(text: &str) -> String {
    let mut s = text.trim();
    for prefix in ["///", "//!", "//", "#!", "##", "#", "--", ";;"] {
        if let Some(rest) = s.strip_prefix(prefix) {
            s = rest.trim();
            break;
        }
    }
    s.trim_matches(['/', '*', '"', '\'']).trim().to_string()
}

fn extract_body_annotations(elements: &mut [SourceElement], lang: Language, lines: &[&str]) {
    let spec = lang.spec();
    let delimiters = &spec.string_delimiters;

    for elem in &mut *elements {
        let kind = elem.element_type;
        if kind.is_single_line() || kind.is_comment() || elem.line_end <= elem.line_start {
            continue;
        }

        let mut comments = Vec::new();
        let mut exits = Vec::new();
        let mut in_multi = false;
        let mut multi_start = 0;
        let mut multi_lines: Vec<&str> = Vec::new();

        let body_end = elem.line_end.min(lines.len());
        for idx in elem.line_start..body_end {
            let stripped = lines[idx].trim();
            if stripped.is_empty() {
                continue;
            }
            let line_num = idx + 1;

            if in_multi {
                multi_lines.push(stripped);
                if spec.multi_comment_end().is_some_and(|end| stripped.contains(end)) {
                    in_multi = false;
                    let text = multi_lines
                        .iter()
                        .map(|l| clean_comment_line(l))
                        .collect::<Vec<_>>()
                        .join(" ");
                    let text = text.trim();
                    if !text.is_empty() {
                        comments.push(BodyComment {
                            line_start: multi_start,
                            line_end: line_num,
                            text: text.to_string(),
                        });
                    }
                    multi_lines.clear();
                }
                continue;
            }

            if let Some((start, end)) = spec.multi_comment
                && let Some(start_pos) = stripped.find(start)
                && !in_string_context(stripped, start_pos, delimiters)
            {
                let after = &stripped[start_pos + start.len()..];
                let one_line = if is_docstring_marker(start) {
                    after.contains(start)
                } else {
                    after.contains(end)
                };
                if one_line {
                    let text = clean_comment_line(stripped);
                    if !text.is_empty() {
                        comments.push(BodyComment {
                            line_start: line_num,
                            line_end: line_num,
                            text,
                        });
                    }
                } else {
                    in_multi = true;
                    multi_start = line_num;
                    multi_lines = vec![stripped];
                }
                continue;
            }

            if let Some(marker) = spec.single_comment
                && let Some(pos) = find_comment(stripped, marker, delimiters)
            {
                let cleaned = clean_comment_line(&stripped[pos..]);
                if !cleaned.is_empty() {
                    comments.push(BodyComment {
                        line_start: line_num,
                        line_end: line_num,
                        text: cleaned,
                    });
                }
                if stripped[..pos].trim().is_empty() {
                    continue;
                }
            }

            if EXIT_EXPLICIT.is_match(stripped) || EXIT_IMPLICIT.is_match(stripped) {
                exits.push(ExitPoint {
                    line: line_num,
                    text: stripped.to_string(),
                });
            }
        }

        elem.body_comments = comments;
        elem.exit_points = exits;
    }
}

fn is_postfix_doc(text: &str) -> bool {
    POSTFIX_DOC.is_match(text)
}

fn extract_doxygen_fields(elements: &mut [SourceElement]) {
    let comments: Vec<SourceElement> = elements
        .iter()
        .filter(|e| e.element_type.is_comment())
        .cloned()
        .collect();

    for elem in &mut *elements {
        if elem.element_type.is_comment() {
            continue;
        }

        let same_line = comments
            .iter()
            .filter(|c| {
                c.line_start == elem.line_end && c.is_inline_comment() && is_postfix_doc(&c.extract)
            })
            .min_by_key(|c| c.line_start);

        let preceding = || {
            comments
                .iter()
                .filter(|c| {
                    !c.is_inline_comment()
                        && c.line_end < elem.line_start
                        && elem.line_start - c.line_end <= 2
                })
                .max_by_key(|c| (c.line_end, c.line_start))
        };

        let following = || {
            comments
                .iter()
                .filter(|c| {
                    !c.is_inline_comment()
                        && c.line_start > elem.line_end
                        && c.line_start - elem.line_end <= 2
                        && is_postfix_doc(&c.extract)
                })
                .min_by_key(|c| (c.line_start, c.line_end))
        };

        if let Some(comment) = same_line.or_else(preceding).or_else(following) {
            elem.doxygen = parse_doxygen_comment(&comment.extract);
        }
    }
}
