//! Doxygen tag extraction from comment blocks.
//!
//! Recognises `@tag` and `\tag` forms. Content for a tag runs until the next
//! tag; repeated tags accumulate.

use std::sync::LazyLock;

use regex::Regex;

use super::types::DoxygenFields;

/// Supported tags in rendering order.
pub const DOXYGEN_TAGS: [&str; 17] = [
    "brief",
    "details",
    "param",
    "param[in]",
    "param[out]",
    "return",
    "retval",
    "exception",
    "throws",
    "warning",
    "deprecated",
    "note",
    "see",
    "sa",
    "satisfies",
    "pre",
    "post",
];

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    let mut tags: Vec<&str> = DOXYGEN_TAGS
        .iter()
        .copied()
        .filter(|tag| !tag.starts_with("param"))
        .collect();
    // Longer names first so `retval` is not read as `return` + `val`.
    tags.sort_by_key(|tag| std::cmp::Reverse(tag.len()));
    let alternation = tags
        .iter()
        .map(|tag| regex::escape(tag))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"[@\\](?:(param)(\[[^\]]+\])?|({alternation}))"))
        .expect("doxygen tag pattern should compile")
});

static LEADING_MARKERS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        r"^[/*#]+\s*",
        r"^\*\s*",
        r"^///?!?\s*",
        r"^#+\s*",
    ]
    .map(|re| Regex::new(re).expect("comment marker pattern should compile"))
});

static SPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" +").expect("space pattern should compile"));

/// Parse doxygen tags out of a raw comment (delimiters included).
pub fn parse_doxygen_comment(comment: &str) -> DoxygenFields {
    let mut fields = DoxygenFields::new();
    if comment.trim().is_empty() {
        return fields;
    }
    let text = strip_comment_delimiters(&comment.replace("\r\n", "\n").replace('\r', "\n"));

    let matches: Vec<_> = TAG_RE.captures_iter(&text).collect();
    for (idx, caps) in matches.iter().enumerate() {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let tag = match (caps.get(1), caps.get(3)) {
            (Some(_), _) => match caps.get(2) {
                Some(direction) => format!("param{}", direction.as_str()),
                None => "param".to_string(),
            },
            (None, Some(other)) => other.as_str().to_string(),
            (None, None) => continue,
        };
        let end = matches
            .get(idx + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |m| m.start());
        let content = normalize_whitespace(text[whole.end()..end].trim());
        if !content.is_empty() {
            fields.entry(tag).or_default().push(content);
        }
    }
    fields
}

/// Render fields as `- Tag: content` bullets in tag order.
pub fn format_doxygen_markdown(fields: &DoxygenFields) -> Vec<String> {
    DOXYGEN_TAGS
        .iter()
        .filter_map(|tag| {
            fields
                .get(*tag)
                .map(|contents| format!("- {}: {}", capitalize(tag), contents.join(" ")))
        })
        .collect()
}

fn strip_comment_delimiters(text: &str) -> String {
    const BARE: [&str; 8] = ["/**", "/*", "*/", "\"\"\"", "'''", "/*!", "///", "//!"];
    let mut cleaned = Vec::new();
    for line in text.split('\n') {
        let trimmed = line.trim();
        if BARE.contains(&trimmed) {
            continue;
        }
        let mut stripped = trimmed.to_string();
        for marker in LEADING_MARKERS.as_slice() {
            stripped = marker.replace(&stripped, "").into_owned();
        }
        if !stripped.is_empty() {
            cleaned.push(stripped);
        }
    }
    cleaned.join("\n")
}

fn normalize_whitespace(text: &str) -> String {
    let collapsed = SPACE_RUNS.replace_all(text, " ");
    let mut lines = Vec::new();
    let mut prev_blank = false;
    for line in collapsed.split('\n').map(str::trim) {
        if line.is_empty() {
            if !prev_blank {
                lines.push(line);
            }
            prev_blank = true;
        } else {
            lines.push(line);
            prev_blank = false;
        }
    }
    lines.join("\n").trim().to_string()
}

/// Upper-case the first character and lower-case the rest.
pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_block_comment_tags() {
        let comment = "/**\n * @brief Load the file.\n * @param path Where to read.\n * @return Parsed contents.\n */";
        let fields = parse_doxygen_comment(comment);
        assert_eq!(fields["brief"], vec!["Load the file."]);
        assert_eq!(fields["param"], vec!["path Where to read."]);
        assert_eq!(fields["return"], vec!["Parsed contents."]);
    }

    #[test]
    fn retval_is_not_split_into_return() {
        let fields = parse_doxygen_comment("/// @retval 0 success");
        assert_eq!(fields.get("retval"), Some(&vec!["0 success".to_string()]));
        assert!(!fields.contains_key("return"));
    }

    #[test]
    fn param_direction_is_part_of_the_key() {
        let fields = parse_doxygen_comment("# \\param[out] buf filled buffer");
        assert_eq!(fields["param[out]"], vec!["buf filled buffer"]);
    }

    #[test]
    fn repeated_tags_accumulate_and_render_joined() {
        let fields = parse_doxygen_comment("// @note first\n// @note second");
        assert_eq!(fields["note"].len(), 2);
        assert_eq!(
            format_doxygen_markdown(&fields),
            vec!["- Note: first second".to_string()]
        );
    }

    #[test]
    fn text_without_tags_yields_nothing() {
        assert!(parse_doxygen_comment("// plain comment").is_empty());
        assert!(parse_doxygen_comment("   ").is_empty());
    }

    #[test]
    fn markdown_follows_tag_order() {
        let fields =
            parse_doxygen_comment("/**\n * @return r\n * @brief b\n * @param[in] x input\n */");
        assert_eq!(
            format_doxygen_markdown(&fields),
            vec![
                "- Brief: b".to_string(),
                "- Param[in]: x input".to_string(),
                "- Return: r".to_string(),
            ]
        );
    }
}
