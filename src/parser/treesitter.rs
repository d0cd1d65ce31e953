//! Tree-sitter plumbing: parser construction and error location.

use tree_sitter::{Language, Node as TsNode, Parser as TsParser, Tree};

use super::LineTable;
use crate::error::{Result, ScanError};

/// Longest source excerpt quoted in a parse error message.
const MAX_EXCERPT: usize = 32;

/// The Java grammar.
pub fn language() -> Language {
    tree_sitter_java::LANGUAGE.into()
}

/// Create a tree-sitter parser configured for Java.
pub fn new_parser() -> Result<TsParser> {
    let mut parser = TsParser::new();
    parser.set_language(&language())?;
    Ok(parser)
}

/// Parse source text into a tree-sitter tree.
///
/// The returned tree may still contain ERROR or MISSING nodes; see [`first_error`].
pub fn parse_tree(parser: &mut TsParser, source: &str) -> Result<Tree> {
    parser.parse(source, None).ok_or_else(|| ScanError::Parse {
        line: 1,
        message: "parser produced no tree".to_string(),
    })
}

/// Locate the first ERROR or MISSING node in pre-order and describe it.
///
/// Returns `None` when the tree is clean.
pub fn first_error(root: TsNode, source: &str) -> Option<ScanError> {
    if !root.has_error() {
        return None;
    }

    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(describe(node, source));
        }
        let mut cursor = node.walk();
        let children: Vec<TsNode> = node
            .children(&mut cursor)
            .filter(|c| c.has_error())
            .collect();
        stack.extend(children.into_iter().rev());
    }

    // has_error() was set but no offending node was reachable.
    Some(ScanError::Parse {
        line: 1,
        message: "syntax error".to_string(),
    })
}

fn describe(node: TsNode, source: &str) -> ScanError {
    let line = LineTable::new(source).line_of(node.start_byte());
    let message = if node.is_missing() {
        format!("missing `{}`", node.kind())
    } else {
        let text = node.utf8_text(source.as_bytes()).unwrap_or("").trim();
        if text.is_empty() {
            "unexpected end of input".to_string()
        } else {
            format!("unexpected `{}`", excerpt(text))
        }
    };
    ScanError::Parse { line, message }
}

fn excerpt(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or("");
    if first_line.chars().count() > MAX_EXCERPT {
        let cut: String = first_line.chars().take(MAX_EXCERPT).collect();
        format!("{}...", cut)
    } else {
        first_line.to_string()
    }
}
