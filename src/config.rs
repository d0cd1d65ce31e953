//! Scan configuration loaded from YAML.
//!
//! Every field is optional. Command-line flags override whatever the file
//! sets.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names searched for in the current directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["methodscan.yaml", ".methodscan.yaml"];

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Text,
    Json,
}

impl Format {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "text" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            other => anyhow::bail!("invalid format {:?}, must be 'text' or 'json'", other),
        }
    }
}

/// A section of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Declarations,
    Signatures,
    Receivers,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Declarations, Section::Signatures, Section::Receivers];

    /// Parse a section name; `all` expands to every section.
    pub fn parse_many(s: &str) -> anyhow::Result<Vec<Self>> {
        match s {
            "declarations" => Ok(vec![Section::Declarations]),
            "signatures" => Ok(vec![Section::Signatures]),
            "receivers" => Ok(vec![Section::Receivers]),
            "all" => Ok(Section::ALL.to_vec()),
            other => anyhow::bail!(
                "invalid section {:?}, must be 'declarations', 'signatures', 'receivers' or 'all'",
                other
            ),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Section::Declarations => "Method Declarations",
            Section::Signatures => "Method Signatures",
            Section::Receivers => "Method Receivers",
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ScanConfig {
    #[serde(default)]
    pub format: Option<Format>,
    /// Report sections to print (default: all, in canonical order).
    #[serde(default)]
    pub sections: Vec<Section>,
    /// Log filter used when RUST_LOG is unset (default: "warn").
    #[serde(default)]
    pub log_level: Option<String>,
    /// File extensions collected when a directory is scanned (default: ["java"]).
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Follow symlinks while walking directories (default: false).
    #[serde(default)]
    pub follow_links: Option<bool>,
}

impl ScanConfig {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: ScanConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config at `path`, or discover one in `dir`, or fall back to defaults.
    pub fn load(path: Option<&Path>, dir: &Path) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => discover(dir),
        };
        let config = match path {
            Some(p) => Self::parse_file(&p)
                .map_err(|e| anyhow::anyhow!("cannot load config {}: {}", p.display(), e))?,
            None => Self::default(),
        };
        validate(&config)?;
        Ok(config)
    }

    pub fn get_format(&self) -> Format {
        self.format.unwrap_or_default()
    }

    /// Sections to print, deduplicated and in canonical order.
    pub fn get_sections(&self) -> Vec<Section> {
        if self.sections.is_empty() {
            return Section::ALL.to_vec();
        }
        Section::ALL
            .into_iter()
            .filter(|s| self.sections.contains(s))
            .collect()
    }

    pub fn get_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("warn")
    }

    pub fn get_extensions(&self) -> Vec<String> {
        if self.extensions.is_empty() {
            vec!["java".to_string()]
        } else {
            self.extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect()
        }
    }

    pub fn should_follow_links(&self) -> bool {
        self.follow_links.unwrap_or(false)
    }
}

/// Find a config file in `dir`.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

/// Validate a config for values serde cannot reject on its own.
pub fn validate(config: &ScanConfig) -> anyhow::Result<()> {
    if let Some(level) = &config.log_level {
        if level.trim().is_empty() {
            anyhow::bail!("log_level must not be empty");
        }
    }
    if config.extensions.iter().any(|e| e.trim_start_matches('.').is_empty()) {
        anyhow::bail!("extensions must not contain empty entries");
    }
    Ok(())
}
