//! Syntax tree model produced by the parser and consumed by the walker.
//!
//! The node set is closed: every construct the extractor cares about has its
//! own variant, and everything else is kept as an opaque [`Expression`] so
//! the walker can still reach nested declarations and invocations inside it.

use std::fmt;

/// Byte range of a node in the original source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start: usize,
    /// Length in bytes. May be 0.
    pub length: usize,
}

impl Span {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// Create a span from start and (exclusive) end offsets.
    pub fn from_bounds(start: usize, end: usize) -> Self {
        Self {
            start,
            length: end.saturating_sub(start),
        }
    }

    /// End byte offset (exclusive).
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end())
    }
}

/// A syntax tree node.
///
/// Equality and drop are iterative, so arbitrarily deep trees never exhaust
/// the call stack.
#[derive(Debug)]
pub struct Node {
    pub span: Span,
    pub kind: NodeKind,
}

/// The closed set of node kinds.
#[derive(Debug)]
pub enum NodeKind {
    /// Root of a parsed file; holds its top-level items.
    CompilationUnit(Vec<Node>),
    MethodDeclaration(MethodDeclaration),
    MethodInvocation(MethodInvocation),
    VariableDeclarationStatement(VariableDeclarationStatement),
    VariableFragment(VariableFragment),
    Expression(Expression),
    Literal(Literal),
}

/// A method or constructor declaration.
#[derive(Debug)]
pub struct MethodDeclaration {
    pub name: String,
    /// Modifiers, parameters and other non-body parts, in source order.
    pub header: Vec<Node>,
    /// Body statements, or `None` for abstract, native and interface methods.
    pub body: Option<Vec<Node>>,
}

/// A method call such as `foo(a)` or `x.foo(a)`.
#[derive(Debug)]
pub struct MethodInvocation {
    pub name: String,
    /// The expression the call is made on; `None` for unqualified calls.
    pub receiver: Option<Box<Node>>,
    pub arguments: Vec<Node>,
}

/// A local variable declaration statement (`int x = 1, y;`).
#[derive(Debug)]
pub struct VariableDeclarationStatement {
    /// One node per declared name. Each is expected to be a [`NodeKind::VariableFragment`].
    pub fragments: Vec<Node>,
}

/// One binding within a variable declaration (the `x = 1` in `int x = 1;`).
#[derive(Debug)]
pub struct VariableFragment {
    pub name: String,
    pub initializer: Option<Box<Node>>,
}

/// Any construct without a dedicated variant.
#[derive(Debug)]
pub struct Expression {
    /// Grammar node kind, e.g. `binary_expression` or `class_declaration`.
    pub kind: String,
    pub children: Vec<Node>,
}

/// A literal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Literal {
    pub kind: LiteralKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Integer,
    Float,
    Boolean,
    Character,
    String,
    TextBlock,
    Null,
}

impl LiteralKind {
    /// Map a grammar node kind to a literal kind.
    pub fn from_grammar_kind(kind: &str) -> Option<Self> {
        match kind {
            "decimal_integer_literal"
            | "hex_integer_literal"
            | "octal_integer_literal"
            | "binary_integer_literal" => Some(LiteralKind::Integer),
            "decimal_floating_point_literal" | "hex_floating_point_literal" => {
                Some(LiteralKind::Float)
            }
            "true" | "false" => Some(LiteralKind::Boolean),
            "character_literal" => Some(LiteralKind::Character),
            "string_literal" => Some(LiteralKind::String),
            "text_block" => Some(LiteralKind::TextBlock),
            "null_literal" => Some(LiteralKind::Null),
            _ => None,
        }
    }

}

impl Node {
    pub fn new(span: Span, kind: NodeKind) -> Self {
        Self { span, kind }
    }

    /// Short name of this node's kind, for messages.
    pub fn kind_name(&self) -> &str {
        match &self.kind {
            NodeKind::CompilationUnit(_) => "compilation_unit",
            NodeKind::MethodDeclaration(_) => "method_declaration",
            NodeKind::MethodInvocation(_) => "method_invocation",
            NodeKind::VariableDeclarationStatement(_) => "variable_declaration_statement",
            NodeKind::VariableFragment(_) => "variable_fragment",
            NodeKind::Expression(e) => &e.kind,
            NodeKind::Literal(_) => "literal",
        }
    }

    /// Direct children in source order.
    ///
    /// Sorted by start offset; nodes starting at the same offset keep the
    /// order in which their parent declares them.
    pub fn children(&self) -> Vec<&Node> {
        let mut children = self.kind.declared_children();
        children.sort_by_key(|n| n.span.start);
        children
    }

    /// Count nodes in this subtree (including `self`) matching a predicate.
    pub fn count_where<F>(&self, pred: F) -> usize
    where
        F: Fn(&Node) -> bool,
    {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if pred(node) {
                count += 1;
            }
            stack.extend(node.children());
        }
        count
    }
}

impl NodeKind {
    /// Direct children in the order the payload declares them.
    fn declared_children(&self) -> Vec<&Node> {
        match self {
            NodeKind::CompilationUnit(items) => items.iter().collect(),
            NodeKind::MethodDeclaration(decl) => decl
                .header
                .iter()
                .chain(decl.body.iter().flatten())
                .collect(),
            NodeKind::MethodInvocation(call) => call
                .receiver
                .as_deref()
                .into_iter()
                .chain(call.arguments.iter())
                .collect(),
            NodeKind::VariableDeclarationStatement(stmt) => stmt.fragments.iter().collect(),
            NodeKind::VariableFragment(frag) => frag.initializer.as_deref().into_iter().collect(),
            NodeKind::Expression(expr) => expr.children.iter().collect(),
            NodeKind::Literal(_) => Vec::new(),
        }
    }

    /// Move every direct child into `out`, leaving this payload childless.
    fn take_children(&mut self, out: &mut Vec<Node>) {
        match self {
            NodeKind::CompilationUnit(items) => out.append(items),
            NodeKind::MethodDeclaration(decl) => {
                out.append(&mut decl.header);
                if let Some(body) = &mut decl.body {
                    out.append(body);
                }
            }
            NodeKind::MethodInvocation(call) => {
                if let Some(receiver) = call.receiver.take() {
                    out.push(*receiver);
                }
                out.append(&mut call.arguments);
            }
            NodeKind::VariableDeclarationStatement(stmt) => out.append(&mut stmt.fragments),
            NodeKind::VariableFragment(frag) => {
                if let Some(initializer) = frag.initializer.take() {
                    out.push(*initializer);
                }
            }
            NodeKind::Expression(expr) => out.append(&mut expr.children),
            NodeKind::Literal(_) => {}
        }
    }

    /// Compare everything but the children themselves. Equal shapes have
    /// child lists of equal length with optional slots filled alike.
    fn same_shape(&self, other: &NodeKind) -> bool {
        match (self, other) {
            (NodeKind::CompilationUnit(a), NodeKind::CompilationUnit(b)) => a.len() == b.len(),
            (NodeKind::MethodDeclaration(a), NodeKind::MethodDeclaration(b)) => {
                a.name == b.name
                    && a.header.len() == b.header.len()
                    && a.body.as_ref().map(Vec::len) == b.body.as_ref().map(Vec::len)
            }
            (NodeKind::MethodInvocation(a), NodeKind::MethodInvocation(b)) => {
                a.name == b.name
                    && a.receiver.is_some() == b.receiver.is_some()
                    && a.arguments.len() == b.arguments.len()
            }
            (NodeKind::VariableDeclarationStatement(a), NodeKind::VariableDeclarationStatement(b)) => {
                a.fragments.len() == b.fragments.len()
            }
            (NodeKind::VariableFragment(a), NodeKind::VariableFragment(b)) => {
                a.name == b.name && a.initializer.is_some() == b.initializer.is_some()
            }
            (NodeKind::Expression(a), NodeKind::Expression(b)) => {
                a.kind == b.kind && a.children.len() == b.children.len()
            }
            (NodeKind::Literal(a), NodeKind::Literal(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            if a.span != b.span || !a.kind.same_shape(&b.kind) {
                return false;
            }
            pending.extend(
                a.kind
                    .declared_children()
                    .into_iter()
                    .zip(b.kind.declared_children()),
            );
        }
        true
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.kind.take_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.kind.take_children(&mut pending);
        }
    }
}

/// Whether `name` is a plain identifier (letter, `_` or `$`, then alphanumerics).
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
