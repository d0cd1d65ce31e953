//! Lowering of the tree-sitter Java grammar into the [`crate::ast`] model.
//!
//! Lowering runs on an explicit work stack: a node is planned on the way
//! down and assembled once all of its children have been lowered, so
//! nesting depth is bounded only by memory.

use tree_sitter::Node as TsNode;

use crate::ast::{
    Expression, Literal, LiteralKind, MethodDeclaration, MethodInvocation, Node, NodeKind, Span,
    VariableDeclarationStatement, VariableFragment,
};
use crate::error::{Result, ScanError};

/// Grammar kinds lowered to [`NodeKind::MethodDeclaration`].
const DECLARATION_KINDS: &[&str] = &["method_declaration", "constructor_declaration"];

/// Expression kind of the synthetic receiver covering `Outer.super`.
pub const QUALIFIED_SUPER_KIND: &str = "qualified_super";

/// Converts tree-sitter nodes into owned AST nodes.
///
/// `shift` is subtracted from every offset, so a tree parsed from wrapped
/// text maps back onto the caller's original source.
pub struct Lowerer<'s> {
    source: &'s [u8],
    shift: usize,
}

enum Task<'t> {
    Lower(TsNode<'t>),
    Assemble(Pending),
}

/// A node waiting for its `arity` lowered children.
struct Pending {
    span: Span,
    shape: Shape,
    arity: usize,
}

/// Everything about a node except its children.
enum Shape {
    Declaration {
        name: String,
        header: usize,
        has_body: bool,
    },
    Invocation {
        name: String,
        receiver: Receiver,
    },
    VariableDeclaration,
    Fragment {
        name: String,
    },
    Expression {
        kind: String,
    },
}

enum Receiver {
    None,
    Object,
    /// `Outer.super.m()`: the object is wrapped in a node spanning through `super`.
    QualifiedSuper(Span),
}

enum Plan<'t> {
    Leaf(Node),
    Branch(Pending, Vec<TsNode<'t>>),
}

impl Pending {
    fn assemble(self, children: Vec<Node>) -> Node {
        let mut children = children.into_iter();
        let kind = match self.shape {
            Shape::Declaration {
                name,
                header,
                has_body,
            } => {
                let header: Vec<Node> = children.by_ref().take(header).collect();
                let body = has_body.then(|| children.collect());
                NodeKind::MethodDeclaration(MethodDeclaration { name, header, body })
            }
            Shape::Invocation { name, receiver } => {
                let receiver = match receiver {
                    Receiver::None => None,
                    Receiver::Object => children.next().map(Box::new),
                    Receiver::QualifiedSuper(span) => children.next().map(|object| {
                        Box::new(Node::new(
                            span,
                            NodeKind::Expression(Expression {
                                kind: QUALIFIED_SUPER_KIND.to_string(),
                                children: vec![object],
                            }),
                        ))
                    }),
                };
                NodeKind::MethodInvocation(MethodInvocation {
                    name,
                    receiver,
                    arguments: children.collect(),
                })
            }
            Shape::VariableDeclaration => {
                NodeKind::VariableDeclarationStatement(VariableDeclarationStatement {
                    fragments: children.collect(),
                })
            }
            Shape::Fragment { name } => NodeKind::VariableFragment(VariableFragment {
                name,
                initializer: children.next().map(Box::new),
            }),
            Shape::Expression { kind } => NodeKind::Expression(Expression {
                kind,
                children: children.collect(),
            }),
        };
        Node::new(self.span, kind)
    }
}

impl<'s> Lowerer<'s> {
    pub fn new(source: &'s [u8], shift: usize) -> Self {
        Self { source, shift }
    }

    fn span(&self, node: TsNode) -> Span {
        Span::from_bounds(
            node.start_byte().saturating_sub(self.shift),
            node.end_byte().saturating_sub(self.shift),
        )
    }

    fn text(&self, node: TsNode) -> Result<String> {
        node.utf8_text(self.source)
            .map(str::to_string)
            .map_err(|e| ScanError::malformed(format!("{} is not valid UTF-8: {}", node.kind(), e)))
    }

    fn required_field<'t>(&self, node: TsNode<'t>, field: &str) -> Result<TsNode<'t>> {
        node.child_by_field_name(field).ok_or_else(|| {
            ScanError::malformed(format!(
                "{} at byte {} has no `{}`",
                node.kind(),
                node.start_byte().saturating_sub(self.shift),
                field
            ))
        })
    }

    /// Lower one node and its subtree.
    pub fn lower(&self, node: TsNode) -> Result<Node> {
        self.lower_all(vec![node])?
            .pop()
            .ok_or_else(|| ScanError::malformed(format!("{} lowered to nothing", node.kind())))
    }

    /// Lower the named, non-comment children of `node`.
    pub fn lower_children(&self, node: TsNode) -> Result<Vec<Node>> {
        self.lower_all(named_children(node))
    }

    /// Lower each of `nodes` with its subtree, keeping their order.
    fn lower_all<'t>(&self, nodes: Vec<TsNode<'t>>) -> Result<Vec<Node>> {
        let mut tasks: Vec<Task<'t>> = nodes.into_iter().rev().map(Task::Lower).collect();
        let mut lowered: Vec<Node> = Vec::new();

        while let Some(task) = tasks.pop() {
            match task {
                Task::Lower(node) => match self.plan(node)? {
                    Plan::Leaf(leaf) => lowered.push(leaf),
                    Plan::Branch(pending, children) => {
                        tasks.push(Task::Assemble(pending));
                        tasks.extend(children.into_iter().rev().map(Task::Lower));
                    }
                },
                Task::Assemble(pending) => {
                    // Each finished task leaves exactly one node, so the
                    // children are the last `arity` entries.
                    let split = lowered.len().checked_sub(pending.arity).ok_or_else(|| {
                        ScanError::malformed(format!(
                            "node at byte {} lost its children",
                            pending.span.start
                        ))
                    })?;
                    let children = lowered.split_off(split);
                    lowered.push(pending.assemble(children));
                }
            }
        }
        Ok(lowered)
    }

    /// Decide what `node` becomes and which grammar nodes are its children.
    fn plan<'t>(&self, node: TsNode<'t>) -> Result<Plan<'t>> {
        let span = self.span(node);
        let (shape, children) = match node.kind() {
            k if DECLARATION_KINDS.contains(&k) => self.method_declaration(node)?,
            "method_invocation" => self.method_invocation(node)?,
            "local_variable_declaration" => {
                let mut cursor = node.walk();
                let declarators: Vec<TsNode> = node
                    .children_by_field_name("declarator", &mut cursor)
                    .collect();
                (Shape::VariableDeclaration, declarators)
            }
            "variable_declarator" => {
                let name = self.text(self.required_field(node, "name")?)?;
                let value = node.child_by_field_name("value");
                (Shape::Fragment { name }, value.into_iter().collect())
            }
            k => match LiteralKind::from_grammar_kind(k) {
                Some(kind) => return Ok(Plan::Leaf(Node::new(span, NodeKind::Literal(Literal { kind })))),
                None => (
                    Shape::Expression {
                        kind: k.to_string(),
                    },
                    named_children(node),
                ),
            },
        };

        let pending = Pending {
            span,
            shape,
            arity: children.len(),
        };
        Ok(Plan::Branch(pending, children))
    }

    fn method_declaration<'t>(&self, node: TsNode<'t>) -> Result<(Shape, Vec<TsNode<'t>>)> {
        let name_node = self.required_field(node, "name")?;
        let body_node = node.child_by_field_name("body");

        let mut children: Vec<TsNode> = named_children(node)
            .into_iter()
            .filter(|c| *c != name_node && Some(*c) != body_node)
            .collect();
        let header = children.len();

        // `block` for methods, `constructor_body` for constructors.
        if let Some(body) = body_node {
            children.extend(named_children(body));
        }

        let shape = Shape::Declaration {
            name: self.text(name_node)?,
            header,
            has_body: body_node.is_some(),
        };
        Ok((shape, children))
    }

    fn method_invocation<'t>(&self, node: TsNode<'t>) -> Result<(Shape, Vec<TsNode<'t>>)> {
        let name_node = self.required_field(node, "name")?;
        let arguments_node = self.required_field(node, "arguments")?;

        let mut children = Vec::new();
        let receiver = match node.child_by_field_name("object") {
            Some(object) => {
                children.push(object);
                // `super` after the object is an unnamed-field child.
                let qualified_super = named_children(node)
                    .into_iter()
                    .find(|c| c.kind() == "super" && *c != object);
                match qualified_super {
                    Some(sup) => Receiver::QualifiedSuper(Span::from_bounds(
                        object.start_byte().saturating_sub(self.shift),
                        sup.end_byte().saturating_sub(self.shift),
                    )),
                    None => Receiver::Object,
                }
            }
            None => Receiver::None,
        };
        children.extend(named_children(arguments_node));

        let shape = Shape::Invocation {
            name: self.text(name_node)?,
            receiver,
        };
        Ok((shape, children))
    }
}

fn named_children(node: TsNode) -> Vec<TsNode> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| !c.is_extra())
        .collect()
}
