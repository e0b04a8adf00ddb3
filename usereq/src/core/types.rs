//! Shared types for source analysis.

use std::collections::BTreeMap;
use std::fmt;

/// Kind of construct recognised in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementType {
    Function,
    Method,
    Class,
    Struct,
    Enum,
    Trait,
    Interface,
    Module,
    Impl,
    Macro,
    Constant,
    Variable,
    TypeAlias,
    Import,
    Decorator,
    CommentSingle,
    CommentMulti,
    Component,
    Protocol,
    Extension,
    Union,
    Namespace,
    Property,
    Signal,
    Typedef,
}

impl ElementType {
    pub const ALL: [ElementType; 25] = [
        ElementType::Function,
        ElementType::Method,
        ElementType::Class,
        ElementType::Struct,
        ElementType::Enum,
        ElementType::Trait,
        ElementType::Interface,
        ElementType::Module,
        ElementType::Impl,
        ElementType::Macro,
        ElementType::Constant,
        ElementType::Variable,
        ElementType::TypeAlias,
        ElementType::Import,
        ElementType::Decorator,
        ElementType::CommentSingle,
        ElementType::CommentMulti,
        ElementType::Component,
        ElementType::Protocol,
        ElementType::Extension,
        ElementType::Union,
        ElementType::Namespace,
        ElementType::Property,
        ElementType::Signal,
        ElementType::Typedef,
    ];

    /// Upper-case name used in tag filters (`CLASS`, `TYPE_ALIAS`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Function => "FUNCTION",
            ElementType::Method => "METHOD",
            ElementType::Class => "CLASS",
            ElementType::Struct => "STRUCT",
            ElementType::Enum => "ENUM",
            ElementType::Trait => "TRAIT",
            ElementType::Interface => "INTERFACE",
            ElementType::Module => "MODULE",
            ElementType::Impl => "IMPL",
            ElementType::Macro => "MACRO",
            ElementType::Constant => "CONSTANT",
            ElementType::Variable => "VARIABLE",
            ElementType::TypeAlias => "TYPE_ALIAS",
            ElementType::Import => "IMPORT",
            ElementType::Decorator => "DECORATOR",
            ElementType::CommentSingle => "COMMENT_SINGLE",
            ElementType::CommentMulti => "COMMENT_MULTI",
            ElementType::Component => "COMPONENT",
            ElementType::Protocol => "PROTOCOL",
            ElementType::Extension => "EXTENSION",
            ElementType::Union => "UNION",
            ElementType::Namespace => "NAMESPACE",
            ElementType::Property => "PROPERTY",
            ElementType::Signal => "SIGNAL",
            ElementType::Typedef => "TYPEDEF",
        }
    }

    /// Label shown in construct headers. Both comment kinds collapse to `COMMENT`.
    pub fn label(self) -> &'static str {
        if self.is_comment() {
            "COMMENT"
        } else {
            self.as_str()
        }
    }

    pub fn from_tag(tag: &str) -> Option<ElementType> {
        ElementType::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    pub fn is_comment(self) -> bool {
        matches!(self, ElementType::CommentSingle | ElementType::CommentMulti)
    }

    /// Constructs that never span more than their declaration line.
    pub fn is_single_line(self) -> bool {
        matches!(
            self,
            ElementType::Import
                | ElementType::Constant
                | ElementType::Variable
                | ElementType::Decorator
                | ElementType::Macro
                | ElementType::TypeAlias
                | ElementType::Typedef
                | ElementType::Property
        )
    }

    /// Constructs that can enclose other definitions.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            ElementType::Class
                | ElementType::Struct
                | ElementType::Module
                | ElementType::Impl
                | ElementType::Interface
                | ElementType::Trait
                | ElementType::Namespace
                | ElementType::Enum
                | ElementType::Extension
                | ElementType::Protocol
        )
    }

    /// True for anything counted as a definition (not a comment, import, or decorator).
    pub fn is_definition(self) -> bool {
        !self.is_comment() && !matches!(self, ElementType::Import | ElementType::Decorator)
    }

    /// Short kind label used in markdown references.
    pub fn short_kind(self) -> &'static str {
        match self {
            ElementType::Function => "fn",
            ElementType::Method => "method",
            ElementType::Class => "class",
            ElementType::Struct => "struct",
            ElementType::Enum => "enum",
            ElementType::Trait => "trait",
            ElementType::Interface => "iface",
            ElementType::Module => "mod",
            ElementType::Impl => "impl",
            ElementType::Macro => "macro",
            ElementType::Constant => "const",
            ElementType::Variable => "var",
            ElementType::TypeAlias => "type",
            ElementType::Component => "comp",
            ElementType::Property => "prop",
            ElementType::Decorator => "dec",
            ElementType::Typedef => "typedef",
            ElementType::Extension => "ext",
            ElementType::Protocol => "proto",
            ElementType::Namespace => "ns",
            _ => "unk",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comment found inside a definition body (1-based line range).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyComment {
    pub line_start: usize,
    pub line_end: usize,
    pub text: String,
}

/// `return`/`raise`/`exit(...)` style statement inside a definition body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitPoint {
    pub line: usize,
    pub text: String,
}

/// Parsed doxygen tags keyed by tag name (`brief`, `param[in]`, ...).
pub type DoxygenFields = BTreeMap<String, Vec<String>>;

/// A construct located in a source file. Line numbers are 1-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceElement {
    pub element_type: ElementType,
    pub line_start: usize,
    pub line_end: usize,
    /// Up to five lines of source, with `...` marking a cut.
    pub extract: String,
    pub name: Option<String>,
    pub signature: Option<String>,
    pub visibility: Option<String>,
    pub parent_name: Option<String>,
    pub inherits: Option<String>,
    pub depth: usize,
    pub body_comments: Vec<BodyComment>,
    pub exit_points: Vec<ExitPoint>,
    pub doxygen: DoxygenFields,
}

impl SourceElement {
    pub fn new(
        element_type: ElementType,
        line_start: usize,
        line_end: usize,
        extract: String,
        name: Option<String>,
    ) -> Self {
        Self {
            element_type,
            line_start,
            line_end,
            extract,
            name,
            signature: None,
            visibility: None,
            parent_name: None,
            inherits: None,
            depth: 0,
            body_comments: Vec::new(),
            exit_points: Vec::new(),
            doxygen: DoxygenFields::new(),
        }
    }

    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// First line of the extract.
    pub fn first_line(&self) -> &str {
        self.extract.split('\n').next().unwrap_or("")
    }

    pub fn is_inline_comment(&self) -> bool {
        self.element_type.is_comment() && self.name.as_deref() == Some("inline")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_variants_share_label() {
        assert_eq!(ElementType::CommentSingle.label(), "COMMENT");
        assert_eq!(ElementType::CommentMulti.label(), "COMMENT");
        assert_eq!(ElementType::TypeAlias.label(), "TYPE_ALIAS");
    }

    #[test]
    fn from_tag_accepts_upper_case_names() {
        assert_eq!(ElementType::from_tag("IMPL"), Some(ElementType::Impl));
        assert_eq!(ElementType::from_tag("impl"), None);
        assert_eq!(ElementType::from_tag("NOPE"), None);
    }

    #[test]
    fn definition_excludes_imports_and_comments() {
        assert!(ElementType::Function.is_definition());
        assert!(!ElementType::Import.is_definition());
        assert!(!ElementType::Decorator.is_definition());
        assert!(!ElementType::CommentMulti.is_definition());
    }
}
