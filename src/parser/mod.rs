//! Source parsing: text in, [`SourceUnit`] out.
//!
//! This module provides:
//! - `parse`: builds a `SourceUnit` from Java source text
//! - `SourceUnit`: the owned syntax tree plus offset-to-line lookup and
//!   verbatim text recovery for any node
//! - `LineTable`: the offset-to-line mapping on its own
//!
//! Tree-sitter does the tokenizing and grammar work; [`java::Lowerer`] turns
//! its concrete tree into the closed node model of [`crate::ast`].

pub mod java;
pub mod treesitter;

use crate::ast::{Node, NodeKind, Span};
use crate::error::{Result, ScanError};

/// Opening of the synthetic class used for files made of bare methods.
/// Must not contain a line break, so line numbers stay unchanged.
const IMPLICIT_CLASS_OPEN: &str = "class __ImplicitUnit__ { ";
const IMPLICIT_CLASS_CLOSE: &str = "\n}";

/// Maps byte offsets to 1-based line numbers.
///
/// `\n`, `\r\n` and a lone `\r` each end a line. A trailing terminator
/// starts an empty last line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTable {
    /// Byte offset at which each line starts; always begins with 0.
    starts: Vec<usize>,
    len: usize,
}

impl LineTable {
    pub fn new(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut starts = vec![0];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => starts.push(i + 1),
                b'\r' => {
                    if bytes.get(i + 1) == Some(&b'\n') {
                        i += 1;
                    }
                    starts.push(i + 1);
                }
                _ => {}
            }
            i += 1;
        }
        Self {
            starts,
            len: bytes.len(),
        }
    }

    /// Line containing `offset`. Offsets at or past the end resolve to the last line.
    pub fn line_of(&self, offset: usize) -> usize {
        let offset = offset.min(self.len);
        self.starts.partition_point(|&start| start <= offset)
    }

    /// Number of lines in the text.
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}

/// A parsed source file.
///
/// Owns the original text and the whole tree. Immutable once built.
#[derive(Debug)]
pub struct SourceUnit {
    source: String,
    root: Node,
    lines: LineTable,
}

impl SourceUnit {
    /// Assemble a unit from text and an already-built tree.
    ///
    /// The tree's spans are expected to index into `source`; [`SourceUnit::text`]
    /// reports spans that do not as [`ScanError::MalformedTree`].
    pub fn new(source: impl Into<String>, root: Node) -> Self {
        let source = source.into();
        let lines = LineTable::new(&source);
        Self {
            source,
            root,
            lines,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// 1-based line of a byte offset.
    pub fn line_of(&self, offset: usize) -> usize {
        self.lines.line_of(offset)
    }

    /// Number of lines in the source.
    pub fn line_count(&self) -> usize {
        self.lines.line_count()
    }

    /// Verbatim source text covered by `span`.
    pub fn slice(&self, span: Span) -> Result<&str> {
        self.source.get(span.start..span.end()).ok_or_else(|| {
            ScanError::malformed(format!(
                "span {} is outside the source ({} bytes)",
                span,
                self.source.len()
            ))
        })
    }

    /// Verbatim source text of a node.
    pub fn text(&self, node: &Node) -> Result<&str> {
        self.slice(node.span)
    }
}

/// Parse Java source text into a [`SourceUnit`].
///
/// Any syntax error fails the whole parse with [`ScanError::Parse`]; no
/// partial tree is returned. Text consisting only of method declarations
/// with no enclosing type is accepted as the body of an implicit class.
pub fn parse(source: &str) -> Result<SourceUnit> {
    let mut parser = treesitter::new_parser()?;
    let tree = treesitter::parse_tree(&mut parser, source)?;
    let root = tree.root_node();

    let error = match treesitter::first_error(root, source) {
        None => {
            let items = java::Lowerer::new(source.as_bytes(), 0).lower_children(root)?;
            return Ok(unit(source, items));
        }
        Some(error) => error,
    };

    match parse_implicit_class(&mut parser, source)? {
        Some(items) => Ok(unit(source, items)),
        None => Err(error),
    }
}

fn unit(source: &str, items: Vec<Node>) -> SourceUnit {
    let root = Node::new(Span::new(0, source.len()), NodeKind::CompilationUnit(items));
    SourceUnit::new(source, root)
}

/// Re-parse `source` as the body of a synthetic class.
///
/// Returns the lowered class members with offsets relative to `source`, or
/// `None` if the wrapped text does not parse cleanly either.
fn parse_implicit_class(
    parser: &mut tree_sitter::Parser,
    source: &str,
) -> Result<Option<Vec<Node>>> {
    let wrapped = format!("{}{}{}", IMPLICIT_CLASS_OPEN, source, IMPLICIT_CLASS_CLOSE);
    let tree = treesitter::parse_tree(parser, &wrapped)?;
    let root = tree.root_node();
    if root.has_error() || root.named_child_count() != 1 {
        return Ok(None);
    }

    let class = match root.named_child(0) {
        Some(node) if node.kind() == "class_declaration" => node,
        _ => return Ok(None),
    };
    let body = match class.child_by_field_name("body") {
        Some(body) => body,
        None => return Ok(None),
    };

    let lowerer = java::Lowerer::new(wrapped.as_bytes(), IMPLICIT_CLASS_OPEN.len());
    Ok(Some(lowerer.lower_children(body)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_table_basic() {
        let table = LineTable::new("a\nbc\n\nd");
        assert_eq!(table.line_count(), 4);
        assert_eq!(table.line_of(0), 1);
        assert_eq!(table.line_of(1), 1);
        assert_eq!(table.line_of(2), 2);
        assert_eq!(table.line_of(5), 3);
        assert_eq!(table.line_of(6), 4);
    }

    #[test]
    fn test_line_table_past_end_is_last_line() {
        let table = LineTable::new("a\nb");
        assert_eq!(table.line_of(3), 2);
        assert_eq!(table.line_of(1000), 2);

        let empty = LineTable::new("");
        assert_eq!(empty.line_of(0), 1);
        assert_eq!(empty.line_of(10), 1);
    }

    #[test]
    fn test_line_table_crlf_and_cr() {
        let table = LineTable::new("a\r\nb\rc");
        assert_eq!(table.line_count(), 3);
        assert_eq!(table.line_of(1), 1); // '\r'
        assert_eq!(table.line_of(2), 1); // '\n' of the same terminator
        assert_eq!(table.line_of(3), 2);
        assert_eq!(table.line_of(5), 3);
    }

    #[test]
    fn test_parse_class() {
        let unit = parse("class A {\n  void foo() {}\n}\n").unwrap();
        assert!(matches!(unit.root().kind, NodeKind::CompilationUnit(_)));
        assert_eq!(unit.root().span.length, unit.source().len());
        assert_eq!(
            unit.root()
                .count_where(|n| matches!(n.kind, NodeKind::MethodDeclaration(_))),
            1
        );
    }

    #[test]
    fn test_parse_bare_method() {
        let source = "void foo(){ int x = 1; }";
        let unit = parse(source).unwrap();

        let NodeKind::CompilationUnit(items) = &unit.root().kind else {
            panic!("root should be a compilation unit");
        };
        let decl = items
            .iter()
            .find(|n| matches!(n.kind, NodeKind::MethodDeclaration(_)))
            .expect("bare method should be lowered");
        assert_eq!(unit.text(decl).unwrap(), source);
        assert_eq!(unit.line_of(decl.span.start), 1);
    }

    #[test]
    fn test_parse_unbalanced_braces_fails() {
        let err = parse("void foo(){").unwrap_err();
        assert!(matches!(err, ScanError::Parse { .. }));

        let err = parse("class A { void foo() { }").unwrap_err();
        assert!(matches!(err, ScanError::Parse { .. }));
    }

    #[test]
    fn test_slice_out_of_range_is_malformed() {
        let unit = parse("class A {}").unwrap();
        let err = unit.slice(Span::new(5, 100)).unwrap_err();
        assert!(matches!(err, ScanError::MalformedTree { .. }));
    }
}
