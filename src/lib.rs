//! methodscan - method structure extraction for Java source.
//!
//! methodscan parses one source file at a time and reports structural facts
//! about its methods: declarations (name, line span, local variables) and
//! invocations (name, line, argument texts), plus a map from each receiver
//! expression to the methods called on it. It reports syntax only; nothing
//! is resolved to types.
//!
//! # Architecture
//!
//! ```text
//! source text ──▶ parser ──▶ SourceUnit ──▶ walk + Extractor ──▶ ExtractionResult
//!               (tree-sitter,   (ast::Node tree,                     (report)
//!                lowering)      line table)
//! ```
//!
//! - `ast`: the closed node model
//! - `parser`: tree-sitter parsing and lowering into `ast`
//! - `walk`: pre-order traversal with kind-specific `Visitor` callbacks
//! - `extract`: the `Visitor` that collects declaration and invocation facts
//! - `facts`: result records
//! - `report`, `config`, `logging`, `cli`: the command-line driver
//!
//! # Example
//!
//! ```
//! let result = methodscan::analyze("void foo(){ obj.bar(1); }").unwrap();
//! assert_eq!(result.declarations[0].name, "foo");
//! assert_eq!(result.signatures[0].argument_texts, vec!["1"]);
//! assert_eq!(result.calls_on("obj"), ["bar"]);
//! ```

pub mod ast;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod facts;
pub mod logging;
pub mod parser;
pub mod report;
pub mod walk;

pub use ast::{Node, NodeKind, Span};
pub use error::ScanError;
pub use extract::{analyze, extract, Extractor};
pub use facts::{DeclarationRecord, ExtractionResult, SignatureRecord};
pub use parser::{parse, SourceUnit};
pub use walk::{walk, Visitor};
