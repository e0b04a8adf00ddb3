//! ASCII rendering of project-relative file paths.

use std::collections::BTreeMap;

#[derive(Default)]
struct Node {
    children: BTreeMap<String, Node>,
}

/// Render `paths` (forward-slash separated) as a tree rooted at `.`.
pub fn build_ascii_tree<S: AsRef<str>>(paths: &[S]) -> String {
    let mut root = Node::default();
    for path in paths {
        let mut node = &mut root;
        for part in path.as_ref().split('/').filter(|part| !part.is_empty()) {
            node = node.children.entry(part.to_string()).or_default();
        }
    }

    let mut lines = vec![".".to_string()];
    emit(&root, "", &mut lines);
    lines.join("\n")
}

fn emit(node: &Node, prefix: &str, lines: &mut Vec<String>) {
    let count = node.children.len();
    for (idx, (name, child)) in node.children.iter().enumerate() {
        let last = idx + 1 == count;
        let connector = if last { "└── " } else { "├── " };
        lines.push(format!("{prefix}{connector}{name}"));
        if !child.children.is_empty() {
            let extension = if last { "    " } else { "│   " };
            emit(child, &format!("{prefix}{extension}"), lines);
        }
    }
}

/// `# Files Structure` section wrapping the tree in a fence.
pub fn files_structure_markdown<S: AsRef<str>>(paths: &[S]) -> String {
    format!("# Files Structure\n```\n{}\n```", build_ascii_tree(paths))
}
