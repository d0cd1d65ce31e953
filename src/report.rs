//! Output formatting for extraction results.
//!
//! Supports two output formats:
//! - Text: one labeled block per record (`Method Declaration: ..`, `Start Line: ..`)
//! - JSON: structured output for programmatic consumption

use colored::*;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::config::Section;
use crate::error::ScanError;
use crate::facts::{DeclarationRecord, ExtractionResult, SignatureRecord};

/// Report schema version.
pub const REPORT_VERSION: &str = "1";

/// The outcome of scanning one file.
#[derive(Debug)]
pub struct FileReport {
    pub path: String,
    pub outcome: Result<ExtractionResult, ScanError>,
}

impl FileReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

// =============================================================================
// Text Format
// =============================================================================

/// Options for text output.
#[derive(Debug, Clone)]
pub struct TextOptions {
    pub sections: Vec<Section>,
    /// Emit ANSI colors.
    pub color: bool,
    /// Print a `== path ==` header before each file.
    pub file_headers: bool,
}

/// Write results as labeled text blocks.
pub fn write_text<W: Write>(out: &mut W, reports: &[FileReport], opts: &TextOptions) -> anyhow::Result<()> {
    for report in reports {
        if opts.file_headers {
            let header = format!("== {} ==", report.path);
            if opts.color {
                writeln!(out, "{}", header.bold())?;
            } else {
                writeln!(out, "{}", header)?;
            }
        }

        let result = match &report.outcome {
            Ok(result) => result,
            Err(e) => {
                let line = format!("error: {}", e);
                if opts.color {
                    writeln!(out, "{}\n", line.red())?;
                } else {
                    writeln!(out, "{}\n", line)?;
                }
                continue;
            }
        };

        for section in &opts.sections {
            if opts.color {
                writeln!(out, "{}", section.title().cyan().bold())?;
            } else {
                writeln!(out, "{}", section.title())?;
            }
            match section {
                Section::Declarations => {
                    for decl in &result.declarations {
                        writeln!(out, "{}", decl)?;
                    }
                }
                Section::Signatures => {
                    for sig in &result.signatures {
                        writeln!(out, "{}", sig)?;
                    }
                }
                Section::Receivers => {
                    for (receiver, methods) in &result.receiver_calls {
                        writeln!(out, "{} -> {}", receiver, methods.join(", "))?;
                    }
                    writeln!(out)?;
                }
            }
        }
    }
    Ok(())
}

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub files: Vec<JsonFile>,
}

/// One file's entry in the JSON report. Sections not requested are omitted.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonFile {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declarations: Option<Vec<DeclarationRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signatures: Option<Vec<SignatureRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_calls: Option<IndexMap<String, Vec<String>>>,
}

/// Build the JSON report structure.
pub fn to_json_report(reports: &[FileReport], sections: &[Section]) -> JsonReport {
    let files = reports
        .iter()
        .map(|report| match &report.outcome {
            Ok(result) => JsonFile {
                path: report.path.clone(),
                error: None,
                declarations: sections
                    .contains(&Section::Declarations)
                    .then(|| result.declarations.clone()),
                signatures: sections
                    .contains(&Section::Signatures)
                    .then(|| result.signatures.clone()),
                receiver_calls: sections
                    .contains(&Section::Receivers)
                    .then(|| result.receiver_calls.clone()),
            },
            Err(e) => JsonFile {
                path: report.path.clone(),
                error: Some(e.to_string()),
                declarations: None,
                signatures: None,
                receiver_calls: None,
            },
        })
        .collect();

    JsonReport {
        version: REPORT_VERSION.to_string(),
        files,
    }
}

/// Write results in JSON format.
pub fn write_json<W: Write>(out: &mut W, reports: &[FileReport], sections: &[Section]) -> anyhow::Result<()> {
    let report = to_json_report(reports, sections);
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::analyze;

    fn sample() -> Vec<FileReport> {
        vec![FileReport {
            path: "A.java".to_string(),
            outcome: analyze("void foo(){ int x = 1; obj.bar(2); }"),
        }]
    }

    fn plain(sections: Vec<Section>) -> TextOptions {
        TextOptions {
            sections,
            color: false,
            file_headers: false,
        }
    }

    #[test]
    fn test_text_declarations() {
        let mut out = Vec::new();
        write_text(&mut out, &sample(), &plain(vec![Section::Declarations])).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Method Declarations\n\
             Method Declaration: foo\n\
             Start Line: 1\n\
             End Line: 1\n\
             Variables declared in method : x\n\n"
        );
    }

    #[test]
    fn test_text_signatures_and_receivers() {
        let mut out = Vec::new();
        write_text(
            &mut out,
            &sample(),
            &plain(vec![Section::Signatures, Section::Receivers]),
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Method Signature: bar\nStart Line: 1\nNumber of parameters: 1\nParameters list: 2\n"));
        assert!(text.contains("obj -> bar\n"));
    }

    #[test]
    fn test_text_error_entry() {
        let reports = vec![FileReport {
            path: "Bad.java".to_string(),
            outcome: analyze("void foo(){"),
        }];
        let mut out = Vec::new();
        let opts = TextOptions {
            file_headers: true,
            ..plain(Section::ALL.to_vec())
        };
        write_text(&mut out, &reports, &opts).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("== Bad.java ==\nerror: parse error"));
    }

    #[test]
    fn test_json_sections_filtered() {
        let report = to_json_report(&sample(), &[Section::Receivers]);
        assert_eq!(report.version, REPORT_VERSION);
        let file = &report.files[0];
        assert!(file.declarations.is_none());
        assert!(file.signatures.is_none());
        assert_eq!(file.receiver_calls.as_ref().unwrap()["obj"], vec!["bar"]);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["files"][0].get("declarations").is_none());
        assert!(json["files"][0].get("error").is_none());
    }

    #[test]
    fn test_json_error_entry() {
        let reports = vec![FileReport {
            path: "Bad.java".to_string(),
            outcome: analyze("class {"),
        }];
        let mut out = Vec::new();
        write_json(&mut out, &reports, &Section::ALL).unwrap();
        let parsed: JsonReport = serde_json::from_slice(&out).unwrap();
        assert!(parsed.files[0].error.is_some());
        assert!(parsed.files[0].declarations.is_none());
    }
}
