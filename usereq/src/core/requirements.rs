//! Requirement ID checks and renumbering for Markdown requirement documents.
//!
//! An ID is `PREFIX-NNN`. It is a definition when it opens a list item,
//! numbered item, heading or table row (optionally wrapped in `**`, `__` or a
//! backtick); every other occurrence is a reference.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static DEFINITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*+]\s+|\d+\.\s+|#{1,6}\s+|\|\s*)(?:\*\*|__|`)?([A-Z][A-Z0-9]*-\d{3,})\b")
        .expect("definition pattern should compile")
});

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z][A-Z0-9]*)-(\d{3,})\b").expect("id pattern should compile")
});

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct IdKey {
    prefix: String,
    number: u64,
}

impl IdKey {
    fn render(&self, width: usize) -> String {
        format!("{}-{:0width$}", self.prefix, self.number, width = width.max(3))
    }
}

/// One ID occurrence in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdOccurrence {
    pub id: String,
    /// 1-based line number.
    pub line: usize,
    key: IdKey,
    width: usize,
    start: usize,
    end: usize,
}

/// Definitions and references in document order.
#[derive(Debug, Default)]
pub struct IdScan {
    pub definitions: Vec<IdOccurrence>,
    pub references: Vec<IdOccurrence>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdIssue {
    Duplicate { id: String, lines: Vec<usize> },
    SequenceBreak { id: String, line: usize, expected: String },
    UnknownReference { id: String, line: usize },
}

impl fmt::Display for IdIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdIssue::Duplicate { id, lines } => {
                let lines = lines.iter().map(usize::to_string).collect::<Vec<_>>();
                write!(f, "duplicate requirement ID {id} defined on lines {}", lines.join(", "))
            }
            IdIssue::SequenceBreak { id, line, expected } => write!(
                f,
                "requirement ID {id} on line {line} breaks the sequence (expected {expected})"
            ),
            IdIssue::UnknownReference { id, line } => {
                write!(f, "line {line} references undefined requirement ID {id}")
            }
        }
    }
}

/// Result of renumbering: the rewritten text and `(old, new)` pairs in
/// definition order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renumbered {
    pub text: String,
    pub mapping: Vec<(String, String)>,
}

impl Renumbered {
    pub fn changed(&self) -> bool {
        self.mapping.iter().any(|(old, new)| old != new)
    }
}

pub fn scan_ids(doc: &str) -> IdScan {
    let mut scan = IdScan::default();
    for (idx, line) in doc.lines().enumerate() {
        let definition_span = DEFINITION_RE
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| (m.start(), m.end()));

        for caps in TOKEN_RE.captures_iter(line) {
            let (Some(whole), Some(prefix), Some(digits)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            let Ok(number) = digits.as_str().parse::<u64>() else {
                continue;
            };
            let occurrence = IdOccurrence {
                id: whole.as_str().to_string(),
                line: idx + 1,
                key: IdKey {
                    prefix: prefix.as_str().to_string(),
                    number,
                },
                width: digits.len(),
                start: whole.start(),
                end: whole.end(),
            };
            if definition_span == Some((whole.start(), whole.end())) {
                scan.definitions.push(occurrence);
            } else {
                scan.references.push(occurrence);
            }
        }
    }
    scan
}

/// Report duplicates, sequence breaks and dangling references.
pub fn validate_ids(doc: &str) -> Vec<IdIssue> {
    let scan = scan_ids(doc);
    let mut issues = Vec::new();

    let mut lines_by_key: BTreeMap<&IdKey, Vec<usize>> = BTreeMap::new();
    for def in &scan.definitions {
        lines_by_key.entry(&def.key).or_default().push(def.line);
    }
    for def in &scan.definitions {
        if let Some(lines) = lines_by_key.get(&def.key)
            && lines.len() > 1
            && lines[0] == def.line
            && !issues
                .iter()
                .any(|issue| matches!(issue, IdIssue::Duplicate { id, .. } if *id == def.id))
        {
            issues.push(IdIssue::Duplicate {
                id: def.id.clone(),
                lines: lines.clone(),
            });
        }
    }

    let mut next_expected: HashMap<&str, u64> = HashMap::new();
    for def in &scan.definitions {
        let expected = next_expected.entry(def.key.prefix.as_str()).or_insert(1);
        if def.key.number < *expected && lines_by_key.get(&def.key).is_some_and(|l| l.len() > 1) {
            continue;
        }
        if def.key.number != *expected {
            issues.push(IdIssue::SequenceBreak {
                id: def.id.clone(),
                line: def.line,
                expected: IdKey {
                    prefix: def.key.prefix.clone(),
                    number: *expected,
                }
                .render(def.width),
            });
        }
        *expected = def.key.number.saturating_add(1);
    }

    for reference in &scan.references {
        if !lines_by_key.contains_key(&reference.key) {
            issues.push(IdIssue::UnknownReference {
                id: reference.id.clone(),
                line: reference.line,
            });
        }
    }
    issues
}

/// Renumber definitions sequentially per prefix and rewrite every reference.
pub fn renumber_ids(doc: &str) -> Renumbered {
    let scan = scan_ids(doc);
    let mut counters: HashMap<&str, u64> = HashMap::new();
    let mut by_definition: HashMap<(usize, usize), String> = HashMap::new();
    let mut by_key: HashMap<&IdKey, String> = HashMap::new();
    let mut mapping = Vec::with_capacity(scan.definitions.len());

    for def in &scan.definitions {
        let counter = counters.entry(def.key.prefix.as_str()).or_insert(0);
        *counter += 1;
        let new_id = IdKey {
            prefix: def.key.prefix.clone(),
            number: *counter,
        }
        .render(def.width);
        by_definition.insert((def.line, def.start), new_id.clone());
        by_key.entry(&def.key).or_insert_with(|| new_id.clone());
        mapping.push((def.id.clone(), new_id));
    }

    let mut replacements: HashMap<usize, Vec<(usize, usize, &str)>> = HashMap::new();
    for def in &scan.definitions {
        if let Some(new_id) = by_definition.get(&(def.line, def.start)) {
            replacements
                .entry(def.line)
                .or_default()
                .push((def.start, def.end, new_id.as_str()));
        }
    }
    for reference in &scan.references {
        if let Some(new_id) = by_key.get(&reference.key) {
            replacements
                .entry(reference.line)
                .or_default()
                .push((reference.start, reference.end, new_id.as_str()));
        }
    }

    let mut text = String::with_capacity(doc.len());
    for (idx, raw) in doc.split_inclusive('\n').enumerate() {
        let body = raw.trim_end_matches(['\n', '\r']);
        let ending = &raw[body.len()..];
        match replacements.get_mut(&(idx + 1)) {
            Some(spans) => {
                spans.sort_by_key(|(start, _, _)| *start);
                let mut cursor = 0;
                for (start, end, new_id) in spans.iter() {
                    text.push_str(&body[cursor..*start]);
                    text.push_str(new_id);
                    cursor = *end;
                }
                text.push_str(&body[cursor..]);
            }
            None => text.push_str(body),
        }
        text.push_str(ending);
    }

    Renumbered { text, mapping }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "# Requirements\n\n- **PRJ-001**: The tool shall parse input.\n- **PRJ-003**: The tool shall report errors, see PRJ-001.\n\n| REQ-001 | Fast startup |\n";

    #[test]
    fn definitions_and_references_are_separated() {
        let scan = scan_ids(DOC);
        let defs: Vec<&str> = scan.definitions.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(defs, vec!["PRJ-001", "PRJ-003", "REQ-001"]);
        assert_eq!(scan.references.len(), 1);
        assert_eq!(scan.references[0].line, 4);
    }

    #[test]
    fn plain_paragraph_mentions_are_references() {
        let scan = scan_ids("PRJ-001 is mentioned in prose.\n");
        assert!(scan.definitions.is_empty());
        assert_eq!(scan.references.len(), 1);
    }

    #[test]
    fn reports_sequence_break() {
        let issues = validate_ids(DOC);
        assert_eq!(
            issues,
            vec![IdIssue::SequenceBreak {
                id: "PRJ-003".to_string(),
                line: 4,
                expected: "PRJ-002".to_string(),
            }]
        );
    }

    #[test]
    fn reports_duplicates_and_unknown_references() {
        let doc = "1. REQ-001 first\n2. REQ-001 again\n3. REQ-002 needs REQ-009\n";
        let issues = validate_ids(doc);
        assert_eq!(
            issues,
            vec![
                IdIssue::Duplicate {
                    id: "REQ-001".to_string(),
                    lines: vec![1, 2],
                },
                IdIssue::UnknownReference {
                    id: "REQ-009".to_string(),
                    line: 3,
                },
            ]
        );
        assert_eq!(
            issues[0].to_string(),
            "duplicate requirement ID REQ-001 defined on lines 1, 2"
        );
    }

    #[test]
    fn largest_representable_id_is_a_sequence_break() {
        let issues = validate_ids("- PRJ-18446744073709551615 x\n- PRJ-001 y\n");
        assert_eq!(
            issues,
            vec![
                IdIssue::SequenceBreak {
                    id: "PRJ-18446744073709551615".to_string(),
                    line: 1,
                    expected: format!("PRJ-{:020}", 1),
                },
                IdIssue::SequenceBreak {
                    id: "PRJ-001".to_string(),
                    line: 2,
                    expected: "PRJ-18446744073709551615".to_string(),
                },
            ]
        );
    }

    #[test]
    fn clean_document_has_no_issues() {
        let doc = "## PRJ-001 Scope\n- `PRJ-002` Inputs, refines PRJ-001\n";
        assert!(validate_ids(doc).is_empty());
    }

    #[test]
    fn renumber_rewrites_definitions_and_references_in_one_pass() {
        let doc = "- PRJ-002: b, after PRJ-003\n- PRJ-003: c\n";
        let result = renumber_ids(doc);
        assert_eq!(result.text, "- PRJ-001: b, after PRJ-002\n- PRJ-002: c\n");
        assert_eq!(
            result.mapping,
            vec![
                ("PRJ-002".to_string(), "PRJ-001".to_string()),
                ("PRJ-003".to_string(), "PRJ-002".to_string()),
            ]
        );
        assert!(result.changed());
    }

    #[test]
    fn renumber_gives_duplicates_fresh_numbers_and_keeps_width() {
        let doc = "- REQ-0005 a\n- REQ-0005 b\nsee REQ-0005\n";
        let result = renumber_ids(doc);
        assert_eq!(result.text, "- REQ-0001 a\n- REQ-0002 b\nsee REQ-0001\n");
        assert!(validate_ids(&result.text).is_empty());
    }

    #[test]
    fn renumber_is_identity_on_sequential_docs() {
        let doc = "- PRJ-001 a\r\n- PRJ-002 b";
        let result = renumber_ids(doc);
        assert_eq!(result.text, doc);
        assert!(!result.changed());
    }
}
