//! Method declaration and invocation extraction.
//!
//! [`Extractor`] is a [`Visitor`] that accumulates facts while the walker
//! drives it over a [`SourceUnit`]. It holds no state besides its three
//! output collections, and each run starts from a fresh value.

use indexmap::IndexMap;

use crate::ast::{is_identifier, MethodDeclaration, MethodInvocation, Node, NodeKind};
use crate::error::{Result, ScanError};
use crate::facts::{DeclarationRecord, ExtractionResult, SignatureRecord};
use crate::parser::{self, SourceUnit};
use crate::walk::{walk, Visitor};

/// Accumulates declaration and invocation facts for one source unit.
pub struct Extractor<'u> {
    unit: &'u SourceUnit,
    declarations: Vec<DeclarationRecord>,
    signatures: Vec<SignatureRecord>,
    receiver_calls: IndexMap<String, Vec<String>>,
}

impl<'u> Extractor<'u> {
    pub fn new(unit: &'u SourceUnit) -> Self {
        Self {
            unit,
            declarations: Vec::new(),
            signatures: Vec::new(),
            receiver_calls: IndexMap::new(),
        }
    }

    /// Walk the whole unit and return the accumulated facts.
    pub fn run(mut self) -> Result<ExtractionResult> {
        let unit = self.unit;
        walk(unit.root(), &mut self)?;
        Ok(self.finish())
    }

    /// Consume the extractor and return what it has collected so far.
    pub fn finish(self) -> ExtractionResult {
        ExtractionResult {
            declarations: self.declarations,
            signatures: self.signatures,
            receiver_calls: self.receiver_calls,
        }
    }

    fn local_variables(decl: &MethodDeclaration) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let Some(body) = &decl.body else {
            return Ok(names);
        };

        for statement in body {
            let NodeKind::VariableDeclarationStatement(stmt) = &statement.kind else {
                continue;
            };
            for fragment in &stmt.fragments {
                match &fragment.kind {
                    NodeKind::VariableFragment(frag) => names.push(frag.name.clone()),
                    _ => {
                        return Err(ScanError::malformed(format!(
                            "variable declaration in `{}` holds a {} instead of a fragment",
                            decl.name,
                            fragment.kind_name()
                        )))
                    }
                }
            }
        }
        Ok(names)
    }
}

impl Visitor for Extractor<'_> {
    fn visit_method_declaration(&mut self, node: &Node, decl: &MethodDeclaration) -> Result<bool> {
        if !is_identifier(&decl.name) {
            return Err(ScanError::malformed(format!(
                "method declaration at byte {} has invalid name {:?}",
                node.span.start, decl.name
            )));
        }

        let start_line = self.unit.line_of(node.span.start);
        let end_line = self.unit.line_of(node.span.end());
        let variable_names = Self::local_variables(decl)?;

        self.declarations.push(DeclarationRecord {
            name: decl.name.clone(),
            start_line,
            end_line,
            variable_names,
        });
        Ok(true)
    }

    fn visit_method_invocation(&mut self, node: &Node, call: &MethodInvocation) -> Result<bool> {
        if !is_identifier(&call.name) {
            return Err(ScanError::malformed(format!(
                "method invocation at byte {} has invalid name {:?}",
                node.span.start, call.name
            )));
        }

        let argument_texts = call
            .arguments
            .iter()
            .map(|arg| self.unit.text(arg).map(str::to_string))
            .collect::<Result<Vec<_>>>()?;

        self.signatures.push(SignatureRecord {
            name: call.name.clone(),
            start_line: self.unit.line_of(node.span.start),
            argument_count: argument_texts.len(),
            argument_texts,
        });

        if let Some(receiver) = &call.receiver {
            let receiver_text = self.unit.text(receiver)?;
            self.receiver_calls
                .entry(receiver_text.to_string())
                .or_default()
                .push(call.name.clone());
        }
        Ok(true)
    }
}

/// Extract facts from an already-parsed unit.
pub fn extract(unit: &SourceUnit) -> Result<ExtractionResult> {
    Extractor::new(unit).run()
}

/// Parse `source` and extract its facts in one step.
pub fn analyze(source: &str) -> Result<ExtractionResult> {
    let unit = parser::parse(source)?;
    extract(&unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expression, Span, VariableDeclarationStatement, VariableFragment};

    #[test]
    fn test_declaration_with_local_variable() {
        let result = analyze("void foo(){ int x = 1; }").unwrap();
        assert_eq!(
            result.declarations,
            vec![DeclarationRecord {
                name: "foo".to_string(),
                start_line: 1,
                end_line: 1,
                variable_names: vec!["x".to_string()],
            }]
        );
    }

    #[test]
    fn test_unqualified_invocation() {
        let result = analyze("void foo(){ bar(1, \"a\"); }").unwrap();
        assert_eq!(
            result.signatures,
            vec![SignatureRecord {
                name: "bar".to_string(),
                start_line: 1,
                argument_count: 2,
                argument_texts: vec!["1".to_string(), "\"a\"".to_string()],
            }]
        );
        assert!(result.receiver_calls.is_empty());
    }

    #[test]
    fn test_receiver_calls_keep_order() {
        let result = analyze("void foo(){ obj.bar(); obj.baz(); }").unwrap();
        assert_eq!(result.calls_on("obj"), ["bar", "baz"]);
        assert_eq!(result.receiver_calls.len(), 1);
    }

    #[test]
    fn test_empty_body() {
        let result = analyze("void foo(){}").unwrap();
        assert_eq!(result.declarations.len(), 1);
        assert!(result.declarations[0].variable_names.is_empty());
    }

    #[test]
    fn test_abstract_method() {
        let result = analyze("abstract class A {\n  abstract void run();\n}").unwrap();
        let run = result.find_declaration("run").unwrap();
        assert!(run.variable_names.is_empty());
        assert_eq!(run.start_line, 2);
        assert_eq!(run.end_line, 2);
    }

    #[test]
    fn test_unbalanced_braces() {
        let err = analyze("void foo(){ if (x) { }").unwrap_err();
        assert!(matches!(err, ScanError::Parse { .. }));
    }

    #[test]
    fn test_multi_fragment_and_nested_block() {
        let source = "class A {\n  void f() {\n    int a = 1, b;\n    { int hidden = 2; }\n    String s;\n  }\n}";
        let result = analyze(source).unwrap();
        let f = result.find_declaration("f").unwrap();
        assert_eq!(f.variable_names, vec!["a", "b", "s"]);
        assert_eq!(f.start_line, 2);
        assert_eq!(f.end_line, 6);
    }

    #[test]
    fn test_nested_invocations_in_preorder() {
        let source = "class A { void f() { outer(inner(1), x.y().z(2)); } }";
        let result = analyze(source).unwrap();
        let names: Vec<&str> = result.signatures.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["outer", "inner", "z", "y"]);
        assert_eq!(
            result.signatures[0].argument_texts,
            vec!["inner(1)", "x.y().z(2)"]
        );
        assert_eq!(result.calls_on("x.y()"), ["z"]);
        assert_eq!(result.calls_on("x"), ["y"]);
        let keys: Vec<&str> = result.receiver_calls.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["x.y()", "x"]);
    }

    #[test]
    fn test_field_access_receiver() {
        let source = "class A { void f() { System.out.println(\"hi\"); this.g(); } void g() {} }";
        let result = analyze(source).unwrap();
        assert_eq!(result.calls_on("System.out"), ["println"]);
        assert_eq!(result.calls_on("this"), ["g"]);
        assert_eq!(result.declarations.len(), 2);
    }

    #[test]
    fn test_invalid_declaration_name_is_malformed() {
        let source = "void f(){}";
        let decl = Node::new(
            Span::new(0, source.len()),
            NodeKind::MethodDeclaration(MethodDeclaration {
                name: String::new(),
                header: vec![],
                body: None,
            }),
        );
        let root = Node::new(Span::new(0, source.len()), NodeKind::CompilationUnit(vec![decl]));
        let unit = SourceUnit::new(source, root);

        let err = extract(&unit).unwrap_err();
        assert!(matches!(err, ScanError::MalformedTree { .. }));
    }

    #[test]
    fn test_non_fragment_in_declaration_is_malformed() {
        let source = "void f(){ int x; }";
        let bogus = Node::new(
            Span::new(14, 1),
            NodeKind::Expression(Expression {
                kind: "identifier".to_string(),
                children: vec![],
            }),
        );
        let stmt = Node::new(
            Span::new(10, 6),
            NodeKind::VariableDeclarationStatement(VariableDeclarationStatement {
                fragments: vec![bogus],
            }),
        );
        let decl = Node::new(
            Span::new(0, source.len()),
            NodeKind::MethodDeclaration(MethodDeclaration {
                name: "f".to_string(),
                header: vec![],
                body: Some(vec![stmt]),
            }),
        );
        let unit = SourceUnit::new(source, decl);

        let err = extract(&unit).unwrap_err();
        assert!(matches!(err, ScanError::MalformedTree { .. }));
    }

    #[test]
    fn test_hand_built_fragment_is_recorded() {
        let source = "void f(){ int x; }";
        let frag = Node::new(
            Span::new(14, 1),
            NodeKind::VariableFragment(VariableFragment {
                name: "x".to_string(),
                initializer: None,
            }),
        );
        let stmt = Node::new(
            Span::new(10, 6),
            NodeKind::VariableDeclarationStatement(VariableDeclarationStatement {
                fragments: vec![frag],
            }),
        );
        let decl = Node::new(
            Span::new(0, source.len()),
            NodeKind::MethodDeclaration(MethodDeclaration {
                name: "f".to_string(),
                header: vec![],
                body: Some(vec![stmt]),
            }),
        );
        let unit = SourceUnit::new(source, decl);

        let result = extract(&unit).unwrap();
        assert_eq!(result.declarations[0].variable_names, vec!["x"]);
    }
}
