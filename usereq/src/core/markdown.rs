//! Compact markdown reference for one analyzed source file.
//!
//! Sections, in order: header, imports, definitions (with children, doc
//! comments and body annotations), standalone comments, symbol index.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use super::doxygen::format_doxygen_markdown;
use super::lexing::truncate_chars;
use super::types::{ElementType, SourceElement};

const COMMENT_PREFIXES: [&str; 8] = ["///", "//!", "//", "#!", "##", "#", "--", ";;"];

/// `L5` or `L5-9`.
fn loc(elem: &SourceElement) -> String {
    if elem.line_start == elem.line_end {
        format!("L{}", elem.line_start)
    } else {
        format!("L{}-{}", elem.line_start, elem.line_end)
    }
}

fn vis_suffix(elem: &SourceElement) -> String {
    match elem.visibility.as_deref() {
        Some(vis) if vis != "pub" && vis != "public" => format!(" `{vis}`"),
        _ => String::new(),
    }
}

fn sig_or_name(elem: &SourceElement) -> String {
    [elem.signature.as_deref(), elem.name.as_deref()]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .unwrap_or("")
        .to_string()
}

/// Comment lines with markers stripped, skipping `=begin`/`=end` fences.
fn comment_lines(comment: &SourceElement) -> Vec<String> {
    comment
        .extract
        .split('\n')
        .filter_map(|line| {
            let mut s = line.trim();
            for prefix in COMMENT_PREFIXES {
                if let Some(rest) = s.strip_prefix(prefix) {
                    s = rest.trim();
                    break;
                }
            }
            let s = s.trim_matches(['/', '*', '"', '\'']).trim();
            (!s.is_empty() && !s.starts_with("=begin") && !s.starts_with("=end"))
                .then(|| s.to_string())
        })
        .collect()
}

/// Joined comment text; `max_len == 0` means unlimited.
pub fn comment_text(comment: &SourceElement, max_len: usize) -> String {
    let text = comment_lines(comment).join(" ");
    if max_len > 0 {
        truncate_chars(&text, max_len)
    } else {
        text
    }
}

struct CommentMaps<'a> {
    /// Definition start line -> comments ending just above it.
    doc_for_def: BTreeMap<usize, Vec<&'a SourceElement>>,
    standalone: Vec<&'a SourceElement>,
    file_description: String,
}

fn build_comment_maps(elements: &[SourceElement]) -> CommentMaps<'_> {
    let mut sorted: Vec<&SourceElement> = elements.iter().collect();
    sorted.sort_by_key(|e| e.line_start);

    let def_starts: HashSet<usize> = elements
        .iter()
        .filter(|e| e.element_type.is_definition())
        .map(|e| e.line_start)
        .collect();
    let import_starts: HashSet<usize> = elements
        .iter()
        .filter(|e| e.element_type == ElementType::Import)
        .map(|e| e.line_start)
        .collect();

    let comments: Vec<&SourceElement> = sorted
        .into_iter()
        .filter(|e| e.element_type.is_comment())
        .collect();

    let mut file_description = String::new();
    for comment in &comments {
        if comment.line_start > 10 {
            break;
        }
        let text = comment_text(comment, 0);
        if !text.is_empty() && !text.starts_with("/usr/") && !text.starts_with("usr/") {
            file_description = truncate_chars(&text, 200);
            break;
        }
    }

    let mut doc_for_def: BTreeMap<usize, Vec<&SourceElement>> = BTreeMap::new();
    let mut standalone = Vec::new();
    for (idx, comment) in comments.iter().enumerate() {
        if comment.is_inline_comment() {
            continue;
        }
        let mut attached = false;
        for gap in 1..=3 {
            let target = comment.line_end + gap;
            if def_starts.contains(&target) {
                doc_for_def.entry(target).or_default().push(*comment);
                attached = true;
                break;
            }
            if import_starts.contains(&target) {
                break;
            }
        }
        if !attached && (idx != 0 || file_description.is_empty()) {
            standalone.push(*comment);
        }
    }

    CommentMaps {
        doc_for_def,
        standalone,
        file_description,
    }
}

fn render_body_annotations(
    out: &mut Vec<String>,
    elem: &SourceElement,
    indent: &str,
    exclude: &[(usize, usize)],
) {
    let comments: BTreeMap<usize, _> = elem
        .body_comments
        .iter()
        .map(|c| (c.line_start, c))
        .collect();
    let exits: BTreeMap<usize, &str> = elem
        .exit_points
        .iter()
        .map(|e| (e.line, e.text.as_str()))
        .collect();
    let lines: BTreeSet<usize> = comments.keys().chain(exits.keys()).copied().collect();

    for line in lines {
        if exclude.iter().any(|(start, end)| *start <= line && line <= *end) {
            continue;
        }
        match (comments.get(&line), exits.get(&line)) {
            (Some(comment), Some(exit)) => {
                let code = match (exit.find('#'), exit.find("//")) {
                    (Some(pos), _) | (None, Some(pos)) => exit[..pos].trim(),
                    (None, None) => exit,
                };
                out.push(format!("{indent}L{line}> `{code}` — {}", comment.text));
            }
            (None, Some(exit)) => out.push(format!("{indent}L{line}> `{exit}`")),
            (Some(comment), None) => {
                if comment.line_start == comment.line_end {
                    out.push(format!("{indent}L{}> {}", comment.line_start, comment.text));
                } else {
                    out.push(format!(
                        "{indent}L{}-{}> {}",
                        comment.line_start, comment.line_end, comment.text
                    ));
                }
            }
            (None, None) => {}
        }
    }
}

fn is_inline_kind(kind: ElementType) -> bool {
    matches!(
        kind,
        ElementType::Constant
            | ElementType::Variable
            | ElementType::TypeAlias
            | ElementType::Typedef
            | ElementType::Macro
            | ElementType::Property
    )
}

fn shows_index_signature(kind: ElementType) -> bool {
    matches!(
        kind,
        ElementType::Function
            | ElementType::Method
            | ElementType::Class
            | ElementType::Struct
            | ElementType::Trait
            | ElementType::Interface
            | ElementType::Impl
            | ElementType::Enum
    )
}

/// Render enriched `elements` of the file at `path` as markdown.
pub fn format_markdown(
    elements: &[SourceElement],
    path: &str,
    display_name: &str,
    total_lines: usize,
) -> String {
    let mut out: Vec<String> = Vec::new();
    let file_name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());

    let n_defs = elements
        .iter()
        .filter(|e| e.element_type.is_definition())
        .count();
    let n_imports = elements
        .iter()
        .filter(|e| e.element_type == ElementType::Import)
        .count();
    let n_comments = elements
        .iter()
        .filter(|e| e.element_type.is_comment() && !e.is_inline_comment())
        .count();
    let maps = build_comment_maps(elements);

    out.push(format!(
        "# {file_name} | {display_name} | {total_lines}L | {n_defs} symbols | {n_imports} imports | {n_comments} comments"
    ));
    out.push(format!("> Path: `{path}`"));
    if !maps.file_description.is_empty() {
        out.push(format!("> {}", maps.file_description));
    }
    out.push(String::new());

    let mut imports: Vec<&SourceElement> = elements
        .iter()
        .filter(|e| e.element_type == ElementType::Import)
        .collect();
    imports.sort_by_key(|e| e.line_start);
    if !imports.is_empty() {
        out.push("## Imports".to_string());
        out.push("```".to_string());
        out.extend(imports.iter().map(|imp| imp.first_line().trim().to_string()));
        out.push("```".to_string());
        out.push(String::new());
    }

    let decorators: BTreeMap<usize, String> = elements
        .iter()
        .filter(|e| e.element_type == ElementType::Decorator)
        .map(|e| (e.line_start, e.first_line().trim().to_string()))
        .collect();

    let mut defs: Vec<&SourceElement> = elements
        .iter()
        .filter(|e| e.element_type.is_definition())
        .collect();
    defs.sort_by_key(|e| e.line_start);

    let top_level: Vec<&SourceElement> = defs.iter().copied().filter(|e| e.depth == 0).collect();
    let mut children: BTreeMap<usize, Vec<&SourceElement>> = BTreeMap::new();
    for elem in defs.iter().filter(|e| e.depth > 0) {
        let Some(parent) = elem.parent_name.as_deref() else {
            continue;
        };
        if let Some(top_idx) = top_level.iter().position(|top| {
            top.name.as_deref() == Some(parent)
                && top.line_start <= elem.line_start
                && top.line_end >= elem.line_end
        }) {
            children.entry(top_idx).or_default().push(elem);
        }
    }

    if !top_level.is_empty() {
        out.push("## Definitions".to_string());
        out.push(String::new());

        for (top_idx, elem) in top_level.iter().enumerate() {
            render_definition(&mut out, elem, &maps, &decorators, children.get(&top_idx));
        }
    }

    if !maps.standalone.is_empty() {
        out.push("## Comments".to_string());
        let mut groups: Vec<Vec<&SourceElement>> = Vec::new();
        for comment in maps.standalone.iter().copied() {
            match groups.last_mut() {
                Some(group)
                    if group
                        .last()
                        .is_some_and(|prev| comment.line_start <= prev.line_end + 2) =>
                {
                    group.push(comment);
                }
                _ => groups.push(vec![comment]),
            }
        }
        for group in groups {
            if let [single] = group.as_slice() {
                let text = comment_text(single, 150);
                if !text.is_empty() {
                    out.push(format!("- L{}: {}", single.line_start, text));
                }
                continue;
            }
            let texts: Vec<String> = group
                .iter()
                .map(|c| comment_text(c, 100))
                .filter(|t| !t.is_empty())
                .collect();
            if let (Some(first), Some(last)) = (group.first(), group.last())
                && !texts.is_empty()
            {
                out.push(format!(
                    "- L{}-{}: {}",
                    first.line_start,
                    last.line_end,
                    texts.join(" | ")
                ));
            }
        }
        out.push(String::new());
    }

    if !defs.is_empty() {
        out.push("## Symbol Index".to_string());
        out.push("|Symbol|Kind|Vis|Lines|Sig|".to_string());
        out.push("|---|---|---|---|---|".to_string());
        for elem in &defs {
            let mut name = elem.name.clone().unwrap_or_else(|| "?".to_string());
            if let Some(parent) = &elem.parent_name {
                name = format!("{parent}.{name}");
            }
            let lines = if elem.line_start == elem.line_end {
                elem.line_start.to_string()
            } else {
                format!("{}-{}", elem.line_start, elem.line_end)
            };
            let sig = match &elem.signature {
                Some(sig)
                    if shows_index_signature(elem.element_type)
                        && !sig.is_empty()
                        && Some(sig) != elem.name.as_ref() =>
                {
                    truncate_chars(sig, 60)
                }
                _ => String::new(),
            };
            out.push(format!(
                "|`{name}`|{}|{}|{lines}|{sig}|",
                elem.element_type.short_kind(),
                elem.visibility.as_deref().unwrap_or("")
            ));
        }
        out.push(String::new());
    }

    out.join("\n")
}

fn render_definition(
    out: &mut Vec<String>,
    elem: &SourceElement,
    maps: &CommentMaps<'_>,
    decorators: &BTreeMap<usize, String>,
    kids: Option<&Vec<&SourceElement>>,
) {
    let kind = elem.element_type.short_kind();
    let vis = vis_suffix(elem);

    let mut doc_text = String::new();
    let mut doc_lines: Vec<String> = Vec::new();
    let mut doc_line_num = 0;
    let doxygen = format_doxygen_markdown(&elem.doxygen);
    if !elem.doxygen.is_empty() {
        if let Some(brief) = elem.doxygen.get("brief").and_then(|b| b.first()) {
            doc_text = truncate_chars(brief, 150);
        }
    } else if let Some(first_doc) = maps
        .doc_for_def
        .get(&elem.line_start)
        .and_then(|docs| docs.first())
    {
        doc_lines = comment_lines(first_doc);
        doc_text = truncate_chars(&doc_lines.join(" "), 150);
        doc_line_num = first_doc.line_start;
    }

    if is_inline_kind(elem.element_type) || elem.line_start == elem.line_end {
        let mut line = format!(
            "- {kind} `{}`{vis} (L{})",
            elem.first_line().trim(),
            elem.line_start
        );
        if !doc_text.is_empty() {
            line.push_str(&format!(" — {doc_text}"));
        }
        out.push(line);
        out.extend(doxygen);
        return;
    }

    let sig = if elem.element_type == ElementType::Impl {
        elem.first_line().trim().trim_end_matches([' ', '{']).to_string()
    } else {
        sig_or_name(elem)
    };
    let inherits = elem
        .inherits
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| format!(" : {s}"))
        .unwrap_or_default();
    let decorator = elem
        .line_start
        .checked_sub(1)
        .and_then(|line| decorators.get(&line))
        .map(|dec| format!(" `{dec}`"))
        .unwrap_or_default();
    out.push(format!(
        "### {kind} `{sig}`{inherits}{vis}{decorator} ({})",
        loc(elem)
    ));

    if !doxygen.is_empty() {
        out.extend(doxygen);
    } else if doc_lines.len() > 1 {
        for (idx, line) in doc_lines.iter().take(5).enumerate() {
            out.push(format!("L{}> {line}", doc_line_num + idx));
        }
        if doc_lines.len() > 5 {
            out.push(format!("L{}> ...", doc_line_num + 5));
        }
    } else if !doc_text.is_empty() && doc_line_num > 0 {
        out.push(format!("L{doc_line_num}> {doc_text}"));
    }

    let kids: Vec<&SourceElement> = kids.cloned().unwrap_or_default();
    let child_ranges: Vec<(usize, usize)> = kids
        .iter()
        .map(|child| {
            let start = maps
                .doc_for_def
                .get(&child.line_start)
                .and_then(|docs| docs.first())
                .map_or(child.line_start, |doc| doc.line_start.min(child.line_start));
            (start, child.line_end)
        })
        .collect();
    render_body_annotations(out, elem, "", &child_ranges);

    let mut sorted_kids = kids;
    sorted_kids.sort_by_key(|c| c.line_start);
    for child in sorted_kids {
        let mut child_doc = String::new();
        let child_doxygen = format_doxygen_markdown(&child.doxygen);
        if child.doxygen.is_empty()
            && let Some(doc) = maps
                .doc_for_def
                .get(&child.line_start)
                .and_then(|docs| docs.first())
        {
            let text = comment_text(doc, 100);
            if !text.is_empty() {
                child_doc = format!(" L{}> {text}", doc.line_start);
            }
        }
        out.push(format!(
            "- {} `{}`{} ({}){child_doc}",
            child.element_type.short_kind(),
            sig_or_name(child),
            vis_suffix(child),
            loc(child)
        ));
        out.extend(child_doxygen.iter().map(|line| format!("  {line}")));
        render_body_annotations(out, child, "  ", &[]);
    }

    out.push(String::new());
}
