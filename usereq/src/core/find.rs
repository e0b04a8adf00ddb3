//! Construct lookup by element kind and name pattern.

use std::collections::BTreeSet;

use regex::Regex;

use super::doxygen::capitalize;
use super::languages::Language;
use super::types::SourceElement;

/// Element labels each language can be searched for.
pub fn supported_tags(lang: Language) -> &'static [&'static str] {
    match lang {
        Language::Python => &["CLASS", "FUNCTION", "DECORATOR", "IMPORT", "VARIABLE"],
        Language::C => &[
            "STRUCT", "UNION", "ENUM", "TYPEDEF", "MACRO", "FUNCTION", "IMPORT", "VARIABLE",
        ],
        Language::Cpp => &[
            "CLASS", "STRUCT", "ENUM", "NAMESPACE", "FUNCTION", "MACRO", "IMPORT", "TYPE_ALIAS",
        ],
        Language::Rust => &[
            "FUNCTION", "STRUCT", "ENUM", "TRAIT", "IMPL", "MODULE", "MACRO", "CONSTANT",
            "TYPE_ALIAS", "IMPORT", "DECORATOR",
        ],
        Language::JavaScript => &["CLASS", "FUNCTION", "COMPONENT", "CONSTANT", "IMPORT", "MODULE"],
        Language::TypeScript => &[
            "INTERFACE", "TYPE_ALIAS", "ENUM", "CLASS", "FUNCTION", "NAMESPACE", "MODULE", "IMPORT",
            "DECORATOR",
        ],
        Language::Java => &[
            "CLASS", "INTERFACE", "ENUM", "FUNCTION", "IMPORT", "MODULE", "DECORATOR", "CONSTANT",
        ],
        Language::Go => &[
            "FUNCTION", "METHOD", "STRUCT", "INTERFACE", "TYPE_ALIAS", "CONSTANT", "IMPORT", "MODULE",
        ],
        Language::Ruby => &["CLASS", "MODULE", "FUNCTION", "CONSTANT", "IMPORT", "DECORATOR"],
        Language::Php => &[
            "CLASS", "INTERFACE", "TRAIT", "FUNCTION", "NAMESPACE", "IMPORT", "CONSTANT",
        ],
        Language::Swift => &[
            "CLASS", "STRUCT", "ENUM", "PROTOCOL", "EXTENSION", "FUNCTION", "IMPORT", "CONSTANT",
            "VARIABLE",
        ],
        Language::Kotlin => &[
            "CLASS", "INTERFACE", "ENUM", "FUNCTION", "CONSTANT", "VARIABLE", "MODULE", "IMPORT",
            "DECORATOR",
        ],
        Language::Scala => &[
            "CLASS", "TRAIT", "MODULE", "FUNCTION", "CONSTANT", "VARIABLE", "TYPE_ALIAS", "IMPORT",
        ],
        Language::Lua => &["FUNCTION", "VARIABLE"],
        Language::Shell => &["FUNCTION", "VARIABLE", "IMPORT"],
        Language::Perl => &["FUNCTION", "MODULE", "IMPORT", "CONSTANT"],
        Language::Haskell => &["MODULE", "TYPE_ALIAS", "STRUCT", "CLASS", "FUNCTION", "IMPORT"],
        Language::Zig => &[
            "FUNCTION", "STRUCT", "ENUM", "UNION", "CONSTANT", "VARIABLE", "IMPORT",
        ],
        Language::Elixir => &["MODULE", "FUNCTION", "PROTOCOL", "IMPL", "STRUCT", "IMPORT"],
        Language::CSharp => &[
            "CLASS", "INTERFACE", "STRUCT", "ENUM", "NAMESPACE", "FUNCTION", "PROPERTY", "IMPORT",
            "DECORATOR", "CONSTANT",
        ],
    }
}

/// Split `CLASS|function` into an upper-cased tag set; blanks are dropped.
pub fn parse_tag_filter(filter: &str) -> BTreeSet<String> {
    filter
        .split('|')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_uppercase)
        .collect()
}

pub fn language_supports_any(lang: Language, tags: &BTreeSet<String>) -> bool {
    supported_tags(lang).iter().any(|tag| tags.contains(*tag))
}

/// `- Language: TAG, TAG` per language, both levels sorted.
pub fn format_available_tags() -> String {
    let mut langs: Vec<Language> = Language::ALL.to_vec();
    langs.sort_by_key(|lang| lang.key());
    langs
        .into_iter()
        .map(|lang| {
            let mut tags = supported_tags(lang).to_vec();
            tags.sort_unstable();
            format!("- {}: {}", capitalize(lang.key()), tags.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compiled name filter. A pattern that fails to compile matches nothing.
pub struct ConstructFilter {
    tags: BTreeSet<String>,
    pattern: Option<Regex>,
}

impl ConstructFilter {
    pub fn new(tags: BTreeSet<String>, pattern: &str) -> Self {
        Self {
            tags,
            pattern: Regex::new(pattern).ok(),
        }
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn matches(&self, element: &SourceElement) -> bool {
        if !self.tags.contains(element.element_type.label()) {
            return false;
        }
        match (&element.name, &self.pattern) {
            (Some(name), Some(re)) if !name.is_empty() => re.is_match(name),
            _ => false,
        }
    }
}

/// Render one construct with its complete source range.
pub fn format_construct(element: &SourceElement, source_lines: &[&str], line_numbers: bool) -> String {
    let mut out = vec![format!(
        "### {}: `{}`",
        element.element_type.label(),
        element.name_or_empty()
    )];
    if let Some(signature) = &element.signature {
        out.push(format!("- Signature: `{signature}`"));
    }
    out.push(format!("- Lines: {}-{}", element.line_start, element.line_end));

    let start = element.line_start.saturating_sub(1).min(source_lines.len());
    let end = element.line_end.min(source_lines.len()).max(start);
    let body = source_lines[start..end]
        .iter()
        .enumerate()
        .map(|(offset, line)| {
            if line_numbers {
                format!("{}: {}", element.line_start + offset, line.trim_end())
            } else {
                line.trim_end().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    out.push("```".to_string());
    out.push(body);
    out.push("```".to_string());
    out.join("\n")
}
