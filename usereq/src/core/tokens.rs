//! Token and character metrics for packed output.

use std::path::Path;

use anyhow::Result;
use tiktoken_rs::CoreBPE;

/// Counts `cl100k_base` tokens. Special-token text is encoded literally.
pub struct TokenCounter {
    bpe: CoreBPE,
}

impl TokenCounter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            bpe: tiktoken_rs::cl100k_base()?,
        })
    }

    pub fn count_tokens(&self, content: &str) -> usize {
        self.bpe.encode_ordinary(content).len()
    }

    /// Unicode scalar values, not bytes.
    pub fn count_chars(content: &str) -> usize {
        content.chars().count()
    }
}

/// Metrics for one file; failed reads carry zero counts and the error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetrics {
    pub file: String,
    pub tokens: usize,
    pub chars: usize,
    pub error: Option<String>,
}

impl FileMetrics {
    pub fn counted(file: impl Into<String>, tokens: usize, chars: usize) -> Self {
        Self {
            file: file.into(),
            tokens,
            chars,
            error: None,
        }
    }

    pub fn failed(file: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            tokens: 0,
            chars: 0,
            error: Some(error.into()),
        }
    }
}

pub fn format_pack_summary(results: &[FileMetrics]) -> String {
    let mut lines = Vec::with_capacity(results.len() + 6);
    let mut total_tokens = 0;
    let mut total_chars = 0;

    for result in results {
        let name = Path::new(&result.file)
            .file_name()
            .map_or_else(|| result.file.clone(), |name| name.to_string_lossy().into_owned());
        total_tokens += result.tokens;
        total_chars += result.chars;
        match &result.error {
            Some(err) => lines.push(format!("  ❌ {name}: ERROR - {err}")),
            None => lines.push(format!(
                "  📄 {name}: {} tokens, {} chars",
                group_thousands(result.tokens),
                group_thousands(result.chars)
            )),
        }
    }

    lines.push(String::new());
    lines.push("📊 Pack Summary:".to_string());
    lines.push("────────────────".to_string());
    lines.push(format!("  Total Files: {} files", results.len()));
    lines.push(format!(" Total Tokens: {} tokens", group_thousands(total_tokens)));
    lines.push(format!("  Total Chars: {} chars", group_thousands(total_chars)));
    lines.join("\n")
}

fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn chars_are_scalar_values() {
        assert_eq!(TokenCounter::count_chars("héllo"), 5);
    }

    #[test]
    fn counts_tokens_for_plain_text() {
        let counter = TokenCounter::new().expect("encoder");
        assert!(counter.count_tokens("hello world") > 0);
        assert_eq!(counter.count_tokens(""), 0);
        // Special-token markers are plain text, not a failure.
        assert!(counter.count_tokens("<|endoftext|>") > 1);
    }

    #[test]
    fn summary_lists_files_and_totals() {
        let results = vec![
            FileMetrics::counted("/tmp/a/main.rs", 1200, 4800),
            FileMetrics::failed("missing.py", "not found"),
        ];
        let summary = format_pack_summary(&results);
        assert_eq!(
            summary,
            "  📄 main.rs: 1,200 tokens, 4,800 chars\n  ❌ missing.py: ERROR - not found\n\n📊 Pack Summary:\n────────────────\n  Total Files: 2 files\n Total Tokens: 1,200 tokens\n  Total Chars: 4,800 chars"
        );
    }
}
