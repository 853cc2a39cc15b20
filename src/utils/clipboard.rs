use anyhow::{Context, Result};
use arboard::Clipboard;
use std::fs;
use std::path::PathBuf;

use crate::host::OutputSink;

pub fn copy_to_clipboard(content: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().context("Failed to initialize clipboard")?;
    clipboard
        .set_text(content)
        .context("Failed to set clipboard text")?;
    Ok(())
}

/// Output sink for the command line: the system clipboard, or a document
/// written to `document_path` when the artifact is too large to paste.
#[derive(Debug, Clone)]
pub struct SystemOutput {
    document_path: PathBuf,
    /// Set once a document has been written
    pub written: Option<PathBuf>,
}

impl SystemOutput {
    pub fn new(document_path: impl Into<PathBuf>) -> Self {
        Self {
            document_path: document_path.into(),
            written: None,
        }
    }
}

impl OutputSink for SystemOutput {
    fn write_clipboard(&mut self, text: &str) -> Result<()> {
        copy_to_clipboard(text)
    }

    fn open_as_document(&mut self, text: &str, language: &str) -> Result<()> {
        let mut path = self.document_path.clone();
        if language == "plaintext" && path.extension().is_some_and(|e| e == "md") {
            path.set_extension("txt");
        }
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, text).with_context(|| format!("Failed to write {:?}", path))?;
        log::info!("wrote {} bytes of {} to {:?}", text.len(), language, path);
        self.written = Some(path);
        Ok(())
    }
}
