//! Command-line interface for methodscan.

use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::{Format, ScanConfig, Section};
use crate::error::ScanError;
use crate::extract;
use crate::logging;
use crate::parser;
use crate::report::{self, FileReport, TextOptions};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Extract method declarations, invocations and receivers from Java source.
///
/// Each file is analyzed on its own: declarations with their line span and
/// local variables, every method call with its argument texts, and the
/// methods invoked on each receiver expression.
#[derive(Parser)]
#[command(name = "methodscan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan source files and report method facts
    Scan(ScanArgs),
}

/// Arguments for the scan command.
#[derive(Parser, Debug, Default)]
pub struct ScanArgs {
    /// Files or directories to scan
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Output format: text or json (default: from config, else text)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Report section: declarations, signatures, receivers or all (repeatable)
    #[arg(short, long = "section")]
    pub sections: Vec<String>,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run the scan command, writing the report to stdout.
pub fn run_scan(args: &ScanArgs) -> anyhow::Result<i32> {
    let stdout = std::io::stdout();
    let color = stdout.is_terminal();
    let mut out = stdout.lock();
    run_scan_to(args, &mut out, color)
}

/// Run the scan command, writing the report to `out`.
pub fn run_scan_to<W: Write>(args: &ScanArgs, out: &mut W, color: bool) -> anyhow::Result<i32> {
    let cwd = std::env::current_dir()?;
    let config = match ScanConfig::load(args.config.as_deref(), &cwd) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let level = if args.verbose {
        "debug"
    } else {
        config.get_log_level()
    };
    logging::init(level);

    let format = match args.format.as_deref() {
        Some(f) => match Format::parse(f) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Error: {}", e);
                return Ok(EXIT_ERROR);
            }
        },
        None => config.get_format(),
    };

    let sections = if args.sections.is_empty() {
        config.get_sections()
    } else {
        match resolve_sections(&args.sections) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    };

    let mut files = Vec::new();
    for path in &args.paths {
        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Error: cannot access path {:?}: {}", path, e);
                return Ok(EXIT_ERROR);
            }
        };
        if metadata.is_dir() {
            files.extend(collect_files(
                path,
                &config.get_extensions(),
                config.should_follow_links(),
            )?);
        } else {
            files.push(path.clone());
        }
    }

    if files.is_empty() {
        eprintln!("Warning: no files to scan");
        return Ok(EXIT_SUCCESS);
    }

    tracing::info!(count = files.len(), "scanning files");
    let reports: Vec<FileReport> = files.par_iter().map(|p| scan_file(p)).collect();

    match format {
        Format::Json => report::write_json(out, &reports, &sections)?,
        Format::Text => {
            let opts = TextOptions {
                sections,
                color,
                file_headers: reports.len() > 1,
            };
            report::write_text(out, &reports, &opts)?;
        }
    }

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    if failed > 0 {
        tracing::warn!(failed, "some files could not be analyzed");
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Read and analyze one file.
pub fn scan_file(path: &Path) -> FileReport {
    let outcome = std::fs::read_to_string(path)
        .map_err(|source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        })
        .and_then(|source| {
            let unit = parser::parse(&source)?;
            tracing::trace!(path = %path.display(), lines = unit.line_count(), "parsed");
            extract::extract(&unit)
        });

    match &outcome {
        Ok(result) => tracing::debug!(
            path = %path.display(),
            declarations = result.declarations.len(),
            signatures = result.signatures.len(),
            receivers = result.receiver_calls.len(),
            "analyzed"
        ),
        // Bad input is reported in the output; anything else is worth a warning.
        Err(e) if e.is_source_error() => {
            tracing::debug!(path = %path.display(), error = %e, "analysis failed")
        }
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "cannot analyze"),
    }

    FileReport {
        path: path.to_string_lossy().to_string(),
        outcome,
    }
}

/// Expand `--section` values into a deduplicated list in canonical order.
fn resolve_sections(values: &[String]) -> anyhow::Result<Vec<Section>> {
    let mut requested = Vec::new();
    for value in values {
        requested.extend(Section::parse_many(value)?);
    }
    Ok(Section::ALL
        .into_iter()
        .filter(|s| requested.contains(s))
        .collect())
}

/// Collect source files under `root` with one of `extensions`, sorted by path.
fn collect_files(root: &Path, extensions: &[String], follow_links: bool) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(follow_links)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            // Skip hidden directories below the root
            let name = e.file_name().to_string_lossy();
            !(e.depth() > 0 && e.file_type().is_dir() && name.starts_with('.'))
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if extensions.iter().any(|e| e == ext) {
            files.push(path.to_path_buf());
        }
    }

    tracing::debug!(root = %root.display(), found = files.len(), "collected files");
    Ok(files)
}
