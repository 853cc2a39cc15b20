use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GroupError;

const CONFIG_FILE: &str = "tabgroups.toml";

/// Output format for the context artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Plain,
}

/// Thresholds used while assembling a context artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextLimits {
    /// Files larger than this (bytes) are replaced by a placeholder
    pub max_file_bytes: usize,
    /// Artifacts larger than this (bytes) open as a document instead of the clipboard
    pub clipboard_threshold: usize,
    /// Leading characters probed for a null byte
    pub binary_probe_chars: usize,
    /// Lines of context on each side of a bookmark
    pub bookmark_radius: usize,
    /// Yield to the host every N processed items
    pub yield_every: usize,
    /// Manifest lines shown before "...and N more"
    pub manifest_lines: usize,
    /// Selections larger than this trigger a non-blocking warning
    pub warn_items: usize,
    /// Upper bound on parent-chain walks
    pub max_group_depth: usize,
    /// Extensions never read as text
    pub binary_extensions: Vec<String>,
}

impl Default for ContextLimits {
    fn default() -> Self {
        let binary = vec![
            // Images
            "png", "jpg", "jpeg", "gif", "bmp", "ico", "svg", "webp",
            // Audio / Video
            "mp3", "wav", "ogg", "mp4", "webm", "mov",
            // Archives
            "zip", "tar", "gz", "7z", "rar",
            // Executables / Libraries
            "exe", "dll", "so", "dylib", "bin",
            // Documents
            "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
            // Compiled / Databases
            "class", "pyc", "pyo", "db", "sqlite",
        ];

        Self {
            max_file_bytes: 1024 * 1024,
            clipboard_threshold: 50 * 1024,
            binary_probe_chars: 1000,
            bookmark_radius: 5,
            yield_every: 5,
            manifest_lines: 15,
            warn_items: 20,
            max_group_depth: crate::core::hierarchy::DEFAULT_MAX_DEPTH,
            binary_extensions: binary.into_iter().map(String::from).collect(),
        }
    }
}

impl ContextLimits {
    pub fn is_binary_extension(&self, ext: &str) -> bool {
        !ext.is_empty() && self.binary_extensions.iter().any(|b| b.eq_ignore_ascii_case(ext))
    }
}

/// Main configuration for tabgroups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the persisted group document
    pub store: PathBuf,
    /// Workspace root that display paths are relative to
    pub root: PathBuf,
    /// File written when the context is too large for the clipboard
    pub output: PathBuf,
    /// Output format (Markdown or Plain)
    pub output_format: OutputFormat,
    /// Enable debug logging
    pub verbose: bool,
    pub limits: ContextLimits,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: PathBuf::from(".vscode/virtualTab.json"),
            root: PathBuf::from("."),
            output: PathBuf::from("tabgroups-context.md"),
            output_format: OutputFormat::Markdown,
            verbose: false,
            limits: ContextLimits::default(),
        }
    }
}

impl Config {
    /// Rejects limits that would stall or misroute the context pipeline.
    pub fn validate(&self) -> Result<(), GroupError> {
        if self.limits.yield_every == 0 {
            return Err(GroupError::InvalidConfig(
                "limits.yield_every must be at least 1".into(),
            ));
        }
        if self.limits.clipboard_threshold == 0 {
            return Err(GroupError::InvalidConfig(
                "limits.clipboard_threshold must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Loads `tabgroups.toml` from the current directory, then from the user
    /// config directory.
    pub fn load_from_file() -> Option<Self> {
        let local = PathBuf::from(CONFIG_FILE);
        let user = dirs::config_dir().map(|d| d.join("tabgroups").join("config.toml"));
        std::iter::once(local)
            .chain(user)
            .find_map(|p| Self::load_from(&p))
    }

    pub fn load_from(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("ignoring invalid config {:?}: {}", path, e);
                None
            }
        }
    }
}
