//! Pre-order depth-first traversal over [`Node`] trees.
//!
//! The walker offers each node to the matching [`Visitor`] callback before
//! its children. A callback returns `Ok(true)` to descend, `Ok(false)` to skip
//! the node's children, or an error to abort the whole walk. Every callback
//! defaults to `Ok(true)`.
//!
//! Traversal uses an explicit stack, so tree depth is not bounded by the
//! call stack.

use crate::ast::{
    Expression, Literal, MethodDeclaration, MethodInvocation, Node, NodeKind,
    VariableDeclarationStatement, VariableFragment,
};
use crate::error::Result;

/// Kind-specific callbacks invoked by [`walk`].
///
/// Each callback receives the whole node (for its span) and the variant
/// payload.
#[allow(unused_variables)]
pub trait Visitor {
    fn visit_compilation_unit(&mut self, node: &Node, items: &[Node]) -> Result<bool> {
        Ok(true)
    }

    fn visit_method_declaration(&mut self, node: &Node, decl: &MethodDeclaration) -> Result<bool> {
        Ok(true)
    }

    fn visit_method_invocation(&mut self, node: &Node, call: &MethodInvocation) -> Result<bool> {
        Ok(true)
    }

    fn visit_variable_declaration(
        &mut self,
        node: &Node,
        stmt: &VariableDeclarationStatement,
    ) -> Result<bool> {
        Ok(true)
    }

    fn visit_variable_fragment(&mut self, node: &Node, frag: &VariableFragment) -> Result<bool> {
        Ok(true)
    }

    fn visit_expression(&mut self, node: &Node, expr: &Expression) -> Result<bool> {
        Ok(true)
    }

    fn visit_literal(&mut self, node: &Node, literal: &Literal) -> Result<bool> {
        Ok(true)
    }
}

/// Walk `root` and its descendants in source order, pre-order.
pub fn walk<V: Visitor + ?Sized>(root: &Node, visitor: &mut V) -> Result<()> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if dispatch(node, visitor)? {
            // Reversed so the first child is popped first.
            stack.extend(node.children().into_iter().rev());
        }
    }
    Ok(())
}

fn dispatch<V: Visitor + ?Sized>(node: &Node, visitor: &mut V) -> Result<bool> {
    match &node.kind {
        NodeKind::CompilationUnit(items) => visitor.visit_compilation_unit(node, items),
        NodeKind::MethodDeclaration(decl) => visitor.visit_method_declaration(node, decl),
        NodeKind::MethodInvocation(call) => visitor.visit_method_invocation(node, call),
        NodeKind::VariableDeclarationStatement(stmt) => {
            visitor.visit_variable_declaration(node, stmt)
        }
        NodeKind::VariableFragment(frag) => visitor.visit_variable_fragment(node, frag),
        NodeKind::Expression(expr) => visitor.visit_expression(node, expr),
        NodeKind::Literal(literal) => visitor.visit_literal(node, literal),
    }
}
