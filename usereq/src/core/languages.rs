//! Language table: comment syntax, string delimiters, and construct patterns.
//!
//! Each language carries an ordered list of `(ElementType, Regex)` pairs. The
//! first pattern that matches a line wins, and the identifier is the highest
//! numbered non-empty capture group.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::types::ElementType;

/// Languages understood by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    Python,
    C,
    Cpp,
    Rust,
    JavaScript,
    TypeScript,
    Java,
    Go,
    Ruby,
    Php,
    Swift,
    Kotlin,
    Scala,
    Lua,
    Shell,
    Perl,
    Haskell,
    Zig,
    Elixir,
    CSharp,
}

/// Comment syntax and construct patterns for one language.
#[derive(Debug)]
pub struct LanguageSpec {
    pub single_comment: Option<&'static str>,
    pub multi_comment: Option<(&'static str, &'static str)>,
    /// String delimiters, longest first so triple quotes win over single ones.
    pub string_delimiters: Vec<&'static str>,
    pub patterns: Vec<(ElementType, Regex)>,
}

impl LanguageSpec {
    pub fn multi_comment_start(&self) -> Option<&'static str> {
        self.multi_comment.map(|(start, _)| start)
    }

    pub fn multi_comment_end(&self) -> Option<&'static str> {
        self.multi_comment.map(|(_, end)| end)
    }
}

static SPECS: LazyLock<Vec<LanguageSpec>> =
    LazyLock::new(|| Language::ALL.iter().map(|lang| build_spec(*lang)).collect());

impl Language {
    pub const ALL: [Language; 20] = [
        Language::Python,
        Language::C,
        Language::Cpp,
        Language::Rust,
        Language::JavaScript,
        Language::TypeScript,
        Language::Java,
        Language::Go,
        Language::Ruby,
        Language::Php,
        Language::Swift,
        Language::Kotlin,
        Language::Scala,
        Language::Lua,
        Language::Shell,
        Language::Perl,
        Language::Haskell,
        Language::Zig,
        Language::Elixir,
        Language::CSharp,
    ];

    /// Canonical lower-case key (`python`, `csharp`, ...).
    pub fn key(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Rust => "rust",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Java => "java",
            Language::Go => "go",
            Language::Ruby => "ruby",
            Language::Php => "php",
            Language::Swift => "swift",
            Language::Kotlin => "kotlin",
            Language::Scala => "scala",
            Language::Lua => "lua",
            Language::Shell => "shell",
            Language::Perl => "perl",
            Language::Haskell => "haskell",
            Language::Zig => "zig",
            Language::Elixir => "elixir",
            Language::CSharp => "csharp",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::C => "C",
            Language::Cpp => "C++",
            Language::Rust => "Rust",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Java => "Java",
            Language::Go => "Go",
            Language::Ruby => "Ruby",
            Language::Php => "PHP",
            Language::Swift => "Swift",
            Language::Kotlin => "Kotlin",
            Language::Scala => "Scala",
            Language::Lua => "Lua",
            Language::Shell => "Shell",
            Language::Perl => "Perl",
            Language::Haskell => "Haskell",
            Language::Zig => "Zig",
            Language::Elixir => "Elixir",
            Language::CSharp => "C#",
        }
    }

    /// Resolve a language name or alias (`rs`, `.py`, `Bash`, ...).
    pub fn from_name(name: &str) -> Option<Language> {
        let lowered = name.trim().to_lowercase();
        let key = lowered.trim_start_matches('.');
        let lang = match key {
            "python" | "py" => Language::Python,
            "c" | "h" => Language::C,
            "cpp" | "cc" | "cxx" | "hpp" => Language::Cpp,
            "rust" | "rs" => Language::Rust,
            "javascript" | "js" => Language::JavaScript,
            "typescript" | "ts" => Language::TypeScript,
            "java" => Language::Java,
            "go" => Language::Go,
            "ruby" | "rb" => Language::Ruby,
            "php" => Language::Php,
            "swift" => Language::Swift,
            "kotlin" | "kt" => Language::Kotlin,
            "scala" => Language::Scala,
            "lua" => Language::Lua,
            "shell" | "bash" | "sh" | "zsh" => Language::Shell,
            "perl" | "pl" => Language::Perl,
            "haskell" | "hs" => Language::Haskell,
            "zig" => Language::Zig,
            "elixir" | "ex" | "exs" => Language::Elixir,
            "csharp" | "cs" => Language::CSharp,
            _ => return None,
        };
        Some(lang)
    }

    /// Language for a file path, by extension.
    pub fn from_path(path: &Path) -> Option<Language> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        let lang = match ext.as_str() {
            "py" => Language::Python,
            "js" => Language::JavaScript,
            "ts" => Language::TypeScript,
            "rs" => Language::Rust,
            "go" => Language::Go,
            "c" | "h" => Language::C,
            "cpp" | "hpp" => Language::Cpp,
            "java" => Language::Java,
            "rb" => Language::Ruby,
            "php" => Language::Php,
            "swift" => Language::Swift,
            "kt" => Language::Kotlin,
            "scala" => Language::Scala,
            "lua" => Language::Lua,
            "sh" => Language::Shell,
            "pl" => Language::Perl,
            "hs" => Language::Haskell,
            "zig" => Language::Zig,
            "ex" => Language::Elixir,
            "cs" => Language::CSharp,
            _ => return None,
        };
        Some(lang)
    }

    pub fn spec(self) -> &'static LanguageSpec {
        &SPECS[self as usize]
    }

    /// Languages whose indentation carries meaning (kept by compression).
    pub fn is_indent_significant(self) -> bool {
        matches!(self, Language::Python | Language::Haskell | Language::Elixir)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Sorted canonical keys, e.g. for error messages.
pub fn supported_language_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = Language::ALL.iter().map(|lang| lang.key()).collect();
    keys.sort_unstable();
    keys
}

/// Extensions picked up when scanning project source directories.
pub const SCAN_EXTENSIONS: [&str; 20] = [
    "c", "cpp", "cs", "ex", "go", "hs", "java", "js", "kt", "lua", "pl", "php", "py", "rb", "rs",
    "scala", "sh", "swift", "ts", "zig",
];

fn pattern(element_type: ElementType, re: &str) -> (ElementType, Regex) {
    (
        element_type,
        Regex::new(re).expect("built-in language pattern should compile"),
    )
}

fn spec(
    single_comment: Option<&'static str>,
    multi_comment: Option<(&'static str, &'static str)>,
    string_delimiters: &[&'static str],
    patterns: Vec<(ElementType, Regex)>,
) -> LanguageSpec {
    let mut string_delimiters = string_delimiters.to_vec();
    string_delimiters.sort_by_key(|d| std::cmp::Reverse(d.len()));
    LanguageSpec {
        single_comment,
        multi_comment,
        string_delimiters,
        patterns,
    }
}

const QUOTES: &[&str] = &["\"", "'"];
const C_BLOCK: Option<(&str, &str)> = Some(("/*", "*/"));

fn build_spec(lang: Language) -> LanguageSpec {
    use ElementType as T;

    match lang {
        Language::Python => spec(
            Some("#"),
            Some(("\"\"\"", "\"\"\"")),
            &["\"", "'", "\"\"\"", "'''"],
            vec![
                pattern(T::Class, r"^(\s*class\s+(\w+)\s*[\(:])"),
                pattern(T::Function, r"^(\s*(?:async\s+)?def\s+(\w+)\s*\()"),
                pattern(T::Decorator, r"^(\s*@(\w[\w.]*)\s*)"),
                pattern(T::Import, r"^(\s*(?:from\s+\S+\s+)?import\s+(.+))"),
                pattern(T::Variable, r"^(\s*([A-Z][A-Z_0-9]+)\s*=\s*)"),
            ],
        ),
        Language::C => spec(
            Some("//"),
            C_BLOCK,
            QUOTES,
            vec![
                pattern(T::Struct, r"^(\s*(?:typedef\s+)?struct\s+(\w+))"),
                pattern(T::Union, r"^(\s*(?:typedef\s+)?union\s+(\w+))"),
                pattern(T::Enum, r"^(\s*(?:typedef\s+)?enum\s+(\w+))"),
                pattern(T::Typedef, r"^(\s*typedef\s+.+?\s+(\w+)\s*;)"),
                pattern(T::Macro, r"^(\s*#\s*define\s+(\w+))"),
                pattern(
                    T::Function,
                    r"^(\s*(?:static\s+|inline\s+|extern\s+|const\s+)*(?:(?:unsigned|signed|long|short|volatile|register)\s+)*(?:void|int|char|float|double|long|short|unsigned|signed|size_t|ssize_t|uint\d+_t|int\d+_t|bool|_Bool|FILE|\w+_t|\w+)\s*\**\s+(\w+)\s*\()",
                ),
                pattern(T::Import, r"^(\s*#\s*include\s+(.+))"),
                pattern(
                    T::Variable,
                    r"^(\s*(?:static\s+|extern\s+|const\s+)*(?:const\s+)?(?:char|int|float|double|void|long|short|unsigned|signed|size_t|bool|_Bool|\w+_t)\s*\**\s+(\w+)\s*(?:=|;|\[))",
                ),
            ],
        ),
        Language::Cpp => spec(
            Some("//"),
            C_BLOCK,
            QUOTES,
            vec![
                pattern(T::Class, r"^(\s*(?:template\s*<[^>]*>\s*)?class\s+(\w+))"),
                pattern(T::Struct, r"^(\s*(?:template\s*<[^>]*>\s*)?struct\s+(\w+))"),
                pattern(T::Enum, r"^(\s*enum\s+(?:class\s+)?(\w+))"),
                pattern(T::Namespace, r"^(\s*namespace\s+(\w+))"),
                pattern(
                    T::Function,
                    r"^(\s*(?:static\s+|inline\s+|virtual\s+|explicit\s+|constexpr\s+|consteval\s+|constinit\s+|extern\s+|const\s+)*(?:auto|void|int|char|float|double|long|short|unsigned|signed|bool|string|wstring|size_t|\w+(?:::\w+)*)\s*[&*]*\s*(\w+(?:::\w+)*)\s*\()",
                ),
                pattern(T::Macro, r"^(\s*#\s*define\s+(\w+))"),
                pattern(T::Import, r"^(\s*#\s*include\s+(.+))"),
                pattern(T::TypeAlias, r"^(\s*(?:using|typedef)\s+(\w+))"),
            ],
        ),
        Language::Rust => {
            let vis = r"(?:pub(?:\(\w+\))?\s+)?";
            spec(
                Some("//"),
                C_BLOCK,
                QUOTES,
                vec![
                    pattern(
                        T::Function,
                        &format!(
                            r#"^(\s*{vis}(?:async\s+)?(?:unsafe\s+)?(?:extern\s+"C"\s+)?fn\s+(\w+))"#
                        ),
                    ),
                    pattern(T::Struct, &format!(r"^(\s*{vis}struct\s+(\w+))")),
                    pattern(T::Enum, &format!(r"^(\s*{vis}enum\s+(\w+))")),
                    pattern(T::Trait, &format!(r"^(\s*{vis}(?:unsafe\s+)?trait\s+(\w+))")),
                    pattern(
                        T::Impl,
                        r"^(\s*impl(?:<[^>]*>)?\s+(?:(\w+(?:<[^>]*>)?)\s+for\s+)?(\w+))",
                    ),
                    pattern(T::Module, &format!(r"^(\s*{vis}mod\s+(\w+))")),
                    pattern(T::Macro, &format!(r"^(\s*{vis}macro_rules!\s+(\w+))")),
                    pattern(T::Constant, &format!(r"^(\s*{vis}(?:const|static)\s+(\w+))")),
                    pattern(T::TypeAlias, &format!(r"^(\s*{vis}type\s+(\w+))")),
                    pattern(T::Import, r"^(\s*use\s+(.+?);)"),
                    pattern(T::Decorator, r"^(\s*#\[(\w[^\]]*)\])"),
                ],
            )
        }
        Language::JavaScript => spec(
            Some("//"),
            C_BLOCK,
            &["\"", "'", "`"],
            vec![
                pattern(T::Class, r"^(\s*(?:export\s+)?(?:default\s+)?class\s+(\w+))"),
                pattern(
                    T::Function,
                    r"^(\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s+(\w+)\s*\()",
                ),
                pattern(
                    T::Function,
                    r"^(\s*(?:export\s+)?(?:const|let|var)\s+(\w+)\s*=\s*(?:async\s+)?(?:function|\([^)]*\)\s*=>|[a-zA-Z_]\w*\s*=>))",
                ),
                pattern(
                    T::Component,
                    r"^(\s*(?:export\s+)?(?:default\s+)?(?:const|let|var)\s+(\w+)\s*=\s*(?:React\.)?(?:memo|forwardRef|lazy)\s*\()",
                ),
                pattern(T::Constant, r"^(\s*(?:export\s+)?const\s+([A-Z][A-Z_0-9]+)\s*=)"),
                pattern(T::Import, r"^(\s*import\s+(.+))"),
                pattern(
                    T::Module,
                    r"^(\s*(?:export\s+)?(?:default\s+)?(?:const|let|var)\s+(\w+)\s*=\s*require\s*\()",
                ),
            ],
        ),
        Language::TypeScript => spec(
            Some("//"),
            C_BLOCK,
            &["\"", "'", "`"],
            vec![
                pattern(T::Interface, r"^(\s*(?:export\s+)?interface\s+(\w+))"),
                pattern(
                    T::TypeAlias,
                    r"^(\s*(?:export\s+)?type\s+(\w+)\s*(?:<[^>]*>)?\s*=)",
                ),
                pattern(T::Enum, r"^(\s*(?:export\s+)?(?:const\s+)?enum\s+(\w+))"),
                pattern(
                    T::Class,
                    r"^(\s*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+(\w+))",
                ),
                pattern(
                    T::Function,
                    r"^(\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s+(\w+)\s*)",
                ),
                pattern(
                    T::Function,
                    r"^(\s*(?:export\s+)?(?:const|let|var)\s+(\w+)\s*(?::\s*[^=]+)?\s*=\s*(?:async\s+)?(?:function|\([^)]*\)\s*(?::\s*[^=]+)?\s*=>|[a-zA-Z_]\w*\s*=>))",
                ),
                pattern(
                    T::Namespace,
                    r"^(\s*(?:export\s+)?(?:declare\s+)?namespace\s+(\w+))",
                ),
                pattern(T::Module, r"^(\s*(?:export\s+)?(?:declare\s+)?module\s+(\w+))"),
                pattern(T::Import, r"^(\s*import\s+(.+))"),
                pattern(T::Decorator, r"^(\s*@(\w[\w.]*)\s*)"),
            ],
        ),
        Language::Java => {
            let vis = r"(?:public\s+|private\s+|protected\s+)?";
            spec(
                Some("//"),
                C_BLOCK,
                QUOTES,
                vec![
                    pattern(
                        T::Class,
                        &format!(
                            r"^(\s*{vis}(?:static\s+)?(?:final\s+)?(?:abstract\s+)?class\s+(\w+))"
                        ),
                    ),
                    pattern(T::Interface, &format!(r"^(\s*{vis}interface\s+(\w+))")),
                    pattern(T::Enum, &format!(r"^(\s*{vis}enum\s+(\w+))")),
                    pattern(
                        T::Function,
                        &format!(
                            r"^(\s*{vis}(?:static\s+)?(?:final\s+)?(?:synchronized\s+)?(?:native\s+)?(?:abstract\s+)?(?:<[^>]+>\s+)?(?:void|int|char|float|double|long|short|byte|boolean|String|Object|List|Map|Set|Optional|\w+(?:<[^>]*>)?)\s*(?:\[\])?\s+(\w+)\s*\()"
                        ),
                    ),
                    pattern(T::Import, r"^(\s*import\s+(?:static\s+)?(.+?);)"),
                    pattern(T::Module, r"^(\s*package\s+(.+?);)"),
                    pattern(T::Decorator, r"^(\s*@(\w[\w.]*(?:\([^)]*\))?))"),
                    pattern(
                        T::Constant,
                        &format!(r"^(\s*{vis}static\s+final\s+\w+\s+([A-Z_]\w*)\s*=)"),
                    ),
                ],
            )
        }
        Language::Go => spec(
            Some("//"),
            C_BLOCK,
            &["\"", "`"],
            vec![
                pattern(T::Function, r"^(\s*func\s+(\w+)\s*\()"),
                pattern(T::Method, r"^(\s*func\s+\(\s*\w+\s+\*?\w+\s*\)\s+(\w+)\s*\()"),
                pattern(T::Struct, r"^(\s*type\s+(\w+)\s+struct\b)"),
                pattern(T::Interface, r"^(\s*type\s+(\w+)\s+interface\b)"),
                pattern(T::TypeAlias, r"^(\s*type\s+(\w+)\s+\w)"),
                pattern(T::Constant, r"^(\s*(?:const|var)\s+(\w+))"),
                pattern(T::Import, r"^(\s*import\s+(.+))"),
                pattern(T::Module, r"^(\s*package\s+(\w+))"),
            ],
        ),
        Language::Ruby => spec(
            Some("#"),
            Some(("=begin", "=end")),
            QUOTES,
            vec![
                pattern(T::Class, r"^(\s*class\s+(\w+))"),
                pattern(T::Module, r"^(\s*module\s+(\w+))"),
                pattern(T::Function, r"^(\s*def\s+(?:self\.)?(\w+[?!=]?))"),
                pattern(T::Constant, r"^(\s*([A-Z][A-Z_0-9]+)\s*=)"),
                pattern(T::Import, r"^(\s*require(?:_relative)?\s+(.+))"),
                pattern(T::Decorator, r"^(\s*attr_(?:reader|writer|accessor)\s+(.+))"),
            ],
        ),
        Language::Php => spec(
            Some("//"),
            C_BLOCK,
            QUOTES,
            vec![
                pattern(T::Class, r"^(\s*(?:abstract\s+|final\s+)?class\s+(\w+))"),
                pattern(T::Interface, r"^(\s*interface\s+(\w+))"),
                pattern(T::Trait, r"^(\s*trait\s+(\w+))"),
                pattern(
                    T::Function,
                    r"^(\s*(?:public\s+|private\s+|protected\s+)?(?:static\s+)?function\s+(\w+)\s*\()",
                ),
                pattern(T::Namespace, r"^(\s*namespace\s+(.+?);)"),
                pattern(
                    T::Import,
                    r"^(\s*(?:use|require|require_once|include|include_once)\s+(.+?);)",
                ),
                pattern(T::Constant, r#"^(\s*(?:const|define)\s*\(?\s*['"]?(\w+))"#),
            ],
        ),
        Language::Swift => spec(
            Some("//"),
            C_BLOCK,
            QUOTES,
            vec![
                pattern(
                    T::Class,
                    r"^(\s*(?:public\s+|private\s+|internal\s+|open\s+|fileprivate\s+)?(?:final\s+)?class\s+(\w+))",
                ),
                pattern(
                    T::Struct,
                    r"^(\s*(?:public\s+|private\s+|internal\s+)?struct\s+(\w+))",
                ),
                pattern(T::Enum, r"^(\s*(?:public\s+|private\s+|internal\s+)?enum\s+(\w+))"),
                pattern(
                    T::Protocol,
                    r"^(\s*(?:public\s+|private\s+|internal\s+)?protocol\s+(\w+))",
                ),
                pattern(
                    T::Extension,
                    r"^(\s*(?:public\s+|private\s+|internal\s+)?extension\s+(\w+))",
                ),
                pattern(
                    T::Function,
                    r"^(\s*(?:public\s+|private\s+|internal\s+|open\s+)?(?:static\s+|class\s+)?(?:override\s+)?func\s+(\w+))",
                ),
                pattern(T::Import, r"^(\s*import\s+(\w+))"),
                pattern(
                    T::Constant,
                    r"^(\s*(?:public\s+|private\s+)?(?:static\s+)?let\s+(\w+)\s*(?::|\s*=))",
                ),
                pattern(
                    T::Variable,
                    r"^(\s*(?:public\s+|private\s+)?(?:static\s+)?var\s+(\w+)\s*(?::|\s*=))",
                ),
            ],
        ),
        Language::Kotlin => spec(
            Some("//"),
            C_BLOCK,
            QUOTES,
            vec![
                pattern(
                    T::Class,
                    r"^(\s*(?:open\s+|abstract\s+|sealed\s+|data\s+|inner\s+)*class\s+(\w+))",
                ),
                pattern(T::Interface, r"^(\s*interface\s+(\w+))"),
                pattern(T::Enum, r"^(\s*enum\s+class\s+(\w+))"),
                pattern(
                    T::Function,
                    r"^(\s*(?:public\s+|private\s+|protected\s+|internal\s+)?(?:open\s+|override\s+)?(?:suspend\s+)?fun\s+(?:<[^>]+>\s+)?(\w+)\s*\()",
                ),
                pattern(T::Constant, r"^(\s*(?:const\s+)?val\s+(\w+))"),
                pattern(T::Variable, r"^(\s*var\s+(\w+))"),
                pattern(T::Module, r"^(\s*(?:object|companion\s+object)\s+(\w*))"),
                pattern(T::Import, r"^(\s*import\s+(.+))"),
                pattern(T::Decorator, r"^(\s*@(\w[\w.]*)\s*)"),
            ],
        ),
        Language::Scala => spec(
            Some("//"),
            C_BLOCK,
            QUOTES,
            vec![
                pattern(T::Class, r"^(\s*(?:abstract\s+|sealed\s+|case\s+)?class\s+(\w+))"),
                pattern(T::Trait, r"^(\s*trait\s+(\w+))"),
                pattern(T::Module, r"^(\s*object\s+(\w+))"),
                pattern(T::Function, r"^(\s*(?:override\s+)?def\s+(\w+))"),
                pattern(T::Constant, r"^(\s*val\s+(\w+))"),
                pattern(T::Variable, r"^(\s*var\s+(\w+))"),
                pattern(T::TypeAlias, r"^(\s*type\s+(\w+))"),
                pattern(T::Import, r"^(\s*import\s+(.+))"),
            ],
        ),
        Language::Lua => spec(
            Some("--"),
            Some(("--[[", "]]")),
            QUOTES,
            vec![
                pattern(T::Function, r"^(\s*(?:local\s+)?function\s+(\w[\w.:]*))\s*\("),
                pattern(T::Function, r"^(\s*(?:local\s+)?(\w[\w.]*)\s*=\s*function\s*\()"),
                pattern(T::Variable, r"^(\s*local\s+(\w+)\s*=)"),
            ],
        ),
        Language::Shell => spec(
            Some("#"),
            None,
            QUOTES,
            vec![
                pattern(T::Function, r"^(\s*(?:function\s+)?(\w+)\s*\(\s*\))"),
                pattern(
                    T::Variable,
                    r"^(\s*(?:export\s+|readonly\s+|declare\s+(?:-\w+\s+)*)?([A-Z_][A-Z_0-9]*)\s*=)",
                ),
                pattern(T::Import, r"^(\s*(?:source|\.)\s+(.+))"),
            ],
        ),
        Language::Perl => spec(
            Some("#"),
            Some(("=pod", "=cut")),
            QUOTES,
            vec![
                pattern(T::Function, r"^(\s*sub\s+(\w+))"),
                pattern(T::Module, r"^(\s*package\s+(\w[\w:]*))"),
                pattern(T::Constant, r"^(\s*(?:use\s+constant\s+(\w+)))"),
                pattern(T::Import, r"^(\s*(?:use|require)\s+(.+?);)"),
            ],
        ),
        Language::Haskell => spec(
            Some("--"),
            Some(("{-", "-}")),
            QUOTES,
            vec![
                pattern(T::Module, r"^(\s*module\s+(\w[\w.]*))"),
                pattern(T::TypeAlias, r"^(\s*type\s+(\w+))"),
                pattern(T::Struct, r"^(\s*data\s+(\w+))"),
                pattern(T::Class, r"^(\s*class\s+(\w+))"),
                pattern(T::Function, r"^(([a-z_]\w*)\s*::)"),
                pattern(T::Import, r"^(\s*import\s+(?:qualified\s+)?(.+))"),
            ],
        ),
        Language::Zig => spec(
            Some("//"),
            None,
            QUOTES,
            vec![
                pattern(T::Function, r"^(\s*(?:pub\s+|export\s+)?fn\s+(\w+))"),
                pattern(
                    T::Struct,
                    r"^(\s*(?:pub\s+)?const\s+(\w+)\s*=\s*(?:extern\s+|packed\s+)?struct\b)",
                ),
                pattern(T::Enum, r"^(\s*(?:pub\s+)?const\s+(\w+)\s*=\s*enum\b)"),
                pattern(
                    T::Union,
                    r"^(\s*(?:pub\s+)?const\s+(\w+)\s*=\s*(?:extern\s+|packed\s+)?union\b)",
                ),
                pattern(T::Import, r"^(\s*const\s+(\w+)\s*=\s*@import\()"),
                pattern(T::Constant, r"^(\s*(?:pub\s+)?const\s+(\w+)\s*(?::\s*[^=]+)?\s*=)"),
                pattern(T::Variable, r"^(\s*(?:pub\s+)?var\s+(\w+))"),
            ],
        ),
        Language::Elixir => spec(
            Some("#"),
            None,
            QUOTES,
            vec![
                pattern(T::Module, r"^(\s*defmodule\s+(\w[\w.]*))"),
                pattern(T::Function, r"^(\s*(?:def|defp|defmacro|defmacrop)\s+(\w+))"),
                pattern(T::Protocol, r"^(\s*defprotocol\s+(\w[\w.]*))"),
                pattern(T::Impl, r"^(\s*defimpl\s+(\w[\w.]*))"),
                pattern(T::Struct, r"^(\s*defstruct\s+(.+))"),
                pattern(T::Import, r"^(\s*(?:import|alias|use|require)\s+(.+))"),
            ],
        ),
        Language::CSharp => {
            let vis = r"(?:public\s+|private\s+|protected\s+|internal\s+)?";
            spec(
                Some("//"),
                C_BLOCK,
                QUOTES,
                vec![
                    pattern(
                        T::Class,
                        &format!(
                            r"^(\s*{vis}(?:static\s+)?(?:sealed\s+|abstract\s+|partial\s+)?class\s+(\w+))"
                        ),
                    ),
                    pattern(T::Interface, &format!(r"^(\s*{vis}interface\s+(\w+))")),
                    pattern(T::Struct, &format!(r"^(\s*{vis}(?:readonly\s+)?struct\s+(\w+))")),
                    pattern(T::Enum, &format!(r"^(\s*{vis}enum\s+(\w+))")),
                    pattern(T::Namespace, r"^(\s*namespace\s+(\w[\w.]*))"),
                    pattern(
                        T::Function,
                        &format!(
                            r"^(\s*{vis}(?:static\s+)?(?:async\s+)?(?:virtual\s+|override\s+|abstract\s+)?(?:void|int|char|float|double|long|short|byte|bool|decimal|string|object|var|Task|IEnumerable|\w+(?:<[^>]*>)?)\s*(?:\[\])?\s+(\w+)\s*\()"
                        ),
                    ),
                    pattern(
                        T::Property,
                        &format!(
                            r"^(\s*{vis}(?:static\s+)?(?:virtual\s+|override\s+)?(?:required\s+)?\w+(?:<[^>]*>)?\s+(\w+)\s*\{{)"
                        ),
                    ),
                    pattern(T::Import, r"^(\s*using\s+(.+?);)"),
                    pattern(T::Decorator, r"^(\s*\[(\w[\w.]*(?:\([^)]*\))?)\])"),
                    pattern(
                        T::Constant,
                        r"^(\s*(?:public\s+|private\s+)?const\s+\w+\s+(\w+)\s*=)",
                    ),
                ],
            )
        }
    }
}
