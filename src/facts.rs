//! Fact records produced by extraction.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A method declaration with its line span and local variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationRecord {
    pub name: String,
    /// Line the declaration starts on (1-indexed).
    pub start_line: usize,
    /// Line the declaration ends on (1-indexed).
    pub end_line: usize,
    /// Names bound by variable declarations directly in the body, in order.
    pub variable_names: Vec<String>,
}

/// A method invocation with its argument texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    pub name: String,
    /// Line the invocation starts on (1-indexed).
    pub start_line: usize,
    pub argument_count: usize,
    /// Verbatim source text of each argument.
    pub argument_texts: Vec<String>,
}

/// Everything extracted from one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub declarations: Vec<DeclarationRecord>,
    pub signatures: Vec<SignatureRecord>,
    /// Receiver text to the names of methods invoked on it.
    ///
    /// Keys are in first-seen order; each list is in call order and may
    /// repeat a name.
    pub receiver_calls: IndexMap<String, Vec<String>>,
}

impl ExtractionResult {
    /// Find the first declaration with the given name.
    pub fn find_declaration(&self, name: &str) -> Option<&DeclarationRecord> {
        self.declarations.iter().find(|d| d.name == name)
    }

    /// All invocations of a method name, in encounter order.
    pub fn signatures_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a SignatureRecord> {
        self.signatures.iter().filter(move |s| s.name == name)
    }

    /// Methods invoked on a receiver, or an empty slice if it was never used.
    pub fn calls_on(&self, receiver: &str) -> &[String] {
        self.receiver_calls
            .get(receiver)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty() && self.signatures.is_empty() && self.receiver_calls.is_empty()
    }
}

impl fmt::Display for DeclarationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Method Declaration: {}", self.name)?;
        writeln!(f, "Start Line: {}", self.start_line)?;
        writeln!(f, "End Line: {}", self.end_line)?;
        if self.variable_names.is_empty() {
            writeln!(f, "Variables declared in method : No Variables")
        } else {
            writeln!(
                f,
                "Variables declared in method : {}",
                self.variable_names.join(", ")
            )
        }
    }
}

impl fmt::Display for SignatureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Method Signature: {}", self.name)?;
        writeln!(f, "Start Line: {}", self.start_line)?;
        writeln!(f, "Number of parameters: {}", self.argument_count)?;
        writeln!(f, "Parameters list: {}", self.argument_texts.join(", "))
    }
}
