//! `%%TOKEN%%` substitution for workflow text.

/// Project paths the tokens expand to. All values are project-relative and
/// use `/` separators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderValues {
    pub docs_dir: String,
    pub guidelines_dir: String,
    pub guidelines_files: Vec<String>,
    pub tests_dir: String,
    pub src_dirs: Vec<String>,
}

pub const REQ_DOC: &str = "%%REQ_DOC%%";
pub const DOC_PATH: &str = "%%DOC_PATH%%";
pub const GUIDELINES_PATH: &str = "%%GUIDELINES_PATH%%";
pub const GUIDELINES_FILES: &str = "%%GUIDELINES_FILES%%";
pub const TEST_PATH: &str = "%%TEST_PATH%%";
pub const SRC_PATHS: &str = "%%SRC_PATHS%%";

impl PlaceholderValues {
    pub fn requirements_doc(&self) -> String {
        if self.docs_dir.is_empty() {
            "requirements.md".to_string()
        } else {
            format!("{}/requirements.md", self.docs_dir.trim_end_matches('/'))
        }
    }

    /// Token/value pairs in substitution order.
    ///
    /// Path tokens expand to bare paths. The list tokens expand to backticked,
    /// comma-joined prose since they only make sense inside messages.
    pub fn replacements(&self) -> Vec<(&'static str, String)> {
        vec![
            (REQ_DOC, self.requirements_doc()),
            (DOC_PATH, self.docs_dir.trim_end_matches('/').to_string()),
            (GUIDELINES_PATH, self.guidelines_dir.clone()),
            (GUIDELINES_FILES, backticked(&self.guidelines_files)),
            (TEST_PATH, backticked_dir(&self.tests_dir)),
            (SRC_PATHS, backticked(&self.src_dirs.iter().map(|d| dir_slash(d)).collect::<Vec<_>>())),
        ]
    }

    /// Expand command arguments. An argument that is exactly a list token
    /// becomes one argument per entry.
    pub fn expand_argv(&self, argv: &[String]) -> Vec<String> {
        let replacements = self.replacements();
        let mut out = Vec::with_capacity(argv.len());
        for arg in argv {
            match arg.as_str() {
                SRC_PATHS => out.extend(self.src_dirs.iter().cloned()),
                GUIDELINES_FILES => out.extend(self.guidelines_files.iter().cloned()),
                TEST_PATH => out.push(self.tests_dir.clone()),
                _ => out.push(apply_replacements(arg, &replacements)),
            }
        }
        out
    }
}

/// Literal replacement of every token in order.
pub fn apply_replacements(text: &str, replacements: &[(&str, String)]) -> String {
    let mut out = text.to_string();
    for (token, value) in replacements {
        if out.contains(token) {
            out = out.replace(token, value);
        }
    }
    out
}

fn dir_slash(dir: &str) -> String {
    format!("{}/", dir.trim_end_matches('/'))
}

fn backticked_dir(dir: &str) -> String {
    if dir.is_empty() {
        String::new()
    } else {
        format!("`{}`", dir_slash(dir))
    }
}

fn backticked(items: &[String]) -> String {
    items
        .iter()
        .filter(|item| !item.is_empty())
        .map(|item| format!("`{item}`"))
        .collect::<Vec<_>>()
        .join(", ")
}
