//! Error types for parsing and extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can abort a scan.
///
/// Every variant is fatal to the run that raised it: there is no partial
/// result once one of these is returned.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The source text does not conform to the grammar.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    /// A tree reached the extractor in a shape the parser should never produce.
    #[error("malformed syntax tree: {message}")]
    MalformedTree { message: String },
    /// The source file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The grammar could not be loaded into tree-sitter.
    #[error("grammar setup failed: {0}")]
    Language(#[from] tree_sitter::LanguageError),
}

impl ScanError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        ScanError::MalformedTree {
            message: message.into(),
        }
    }

    /// Whether the error came from the analyzed text rather than the environment.
    pub fn is_source_error(&self) -> bool {
        matches!(self, ScanError::Parse { .. } | ScanError::MalformedTree { .. })
    }
}

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, ScanError>;
