//! Plain text output format for context artifacts

use anyhow::Result;
use std::io::Write;

use super::{BookmarkBlock, Formatter};
use crate::context::manifest::{Manifest, ManifestEntry};

pub struct PlainFormatter;

const RULE: &str = "----------------------------------------";

impl Formatter for PlainFormatter {
    fn document_language(&self) -> &'static str {
        "plaintext"
    }

    fn write_manifest(&mut self, output: &mut dyn Write, manifest: &Manifest) -> Result<()> {
        writeln!(output, "=== CONTEXT SOURCES ({} items) ===", manifest.total())?;
        for entry in manifest.visible() {
            match entry {
                ManifestEntry::Group { name } => writeln!(output, "[Group] {}", name)?,
                ManifestEntry::File { path, deduplicated } => {
                    let suffix = if *deduplicated { " (deduplicated)" } else { "" };
                    writeln!(output, "[File] {}{}", path, suffix)?;
                }
                ManifestEntry::Bookmark { path, line, label } => writeln!(
                    output,
                    "[Bookmark] {}:{} {}",
                    path,
                    line + 1,
                    label.replace('\n', " ")
                )?,
            }
        }
        if manifest.hidden() > 0 {
            writeln!(output, "... and {} more", manifest.hidden())?;
        }
        writeln!(output)?;
        Ok(())
    }

    fn write_file(
        &mut self,
        output: &mut dyn Write,
        path: &str,
        group_paths: &[String],
        _language: &str,
        content: &str,
    ) -> Result<()> {
        writeln!(output, "=== FILE: {} ===", path)?;
        if !group_paths.is_empty() {
            writeln!(output, "Groups: {}", group_paths.join(", "))?;
        }
        writeln!(output, "{}", RULE)?;
        writeln!(output, "{}", content)?;
        writeln!(output, "{}", RULE)?;
        writeln!(output)?;
        Ok(())
    }

    fn write_too_large(&mut self, output: &mut dyn Write, path: &str) -> Result<()> {
        writeln!(output, "=== FILE: {} ===", path)?;
        writeln!(output, "(File too large to include)")?;
        writeln!(output)?;
        Ok(())
    }

    fn write_read_error(&mut self, output: &mut dyn Write, file: &str) -> Result<()> {
        writeln!(output, "=== FILE: {} ===", file)?;
        writeln!(output, "(Error reading file)")?;
        writeln!(output)?;
        Ok(())
    }

    fn write_bookmark_block(&mut self, output: &mut dyn Write, block: &BookmarkBlock<'_>) -> Result<()> {
        writeln!(
            output,
            "=== BOOKMARKS: {} in {} (lines {}-{}) ===",
            block.labels.join(", "),
            block.path,
            block.first_line,
            block.last_line
        )?;
        writeln!(output, "{}", RULE)?;
        writeln!(output, "{}", block.text)?;
        writeln!(output, "{}", RULE)?;
        writeln!(output)?;
        Ok(())
    }

    fn write_bookmark_error(&mut self, output: &mut dyn Write, file: &str) -> Result<()> {
        writeln!(output, "=== BOOKMARK FILE: {} ===", file)?;
        writeln!(output, "(Error reading file)")?;
        writeln!(output)?;
        Ok(())
    }
}
