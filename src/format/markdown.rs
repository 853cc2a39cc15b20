//! Markdown output format for context artifacts

use anyhow::Result;
use std::io::Write;

use super::{BookmarkBlock, Formatter};
use crate::context::manifest::{Manifest, ManifestEntry};

pub struct MarkdownFormatter;

impl Formatter for MarkdownFormatter {
    fn document_language(&self) -> &'static str {
        "markdown"
    }

    fn write_manifest(&mut self, output: &mut dyn Write, manifest: &Manifest) -> Result<()> {
        writeln!(output, "### Context Sources ({} items)", manifest.total())?;
        for entry in manifest.visible() {
            match entry {
                ManifestEntry::Group { name } => writeln!(output, "- **Group**: {}", name)?,
                ManifestEntry::File { path, deduplicated } => {
                    if *deduplicated {
                        writeln!(output, "- **File**: `{}` (Deduplicated)", path)?;
                    } else {
                        writeln!(output, "- **File**: `{}`", path)?;
                    }
                }
                ManifestEntry::Bookmark { path, line, label } => {
                    write!(output, "- **Bookmark**: `{}` (Line {})", path, line + 1)?;
                    if !label.is_empty() {
                        write!(output, " - *{}*", label.replace('\n', " "))?;
                    }
                    writeln!(output)?;
                }
            }
        }
        if manifest.hidden() > 0 {
            writeln!(output, "- ... and {} more", manifest.hidden())?;
        }
        writeln!(output)?;
        Ok(())
    }

    fn write_file(
        &mut self,
        output: &mut dyn Write,
        path: &str,
        group_paths: &[String],
        language: &str,
        content: &str,
    ) -> Result<()> {
        writeln!(output, "## File: {}", path)?;
        if !group_paths.is_empty() {
            writeln!(output, "> In Group: {}", group_paths.join(", "))?;
        }
        writeln!(output, "```{}", language)?;
        writeln!(output, "{}", content)?;
        writeln!(output, "```")?;
        writeln!(output)?;
        Ok(())
    }

    fn write_too_large(&mut self, output: &mut dyn Write, path: &str) -> Result<()> {
        writeln!(output, "## File: {}", path)?;
        writeln!(output, "(File too large to include)")?;
        writeln!(output)?;
        Ok(())
    }

    fn write_read_error(&mut self, output: &mut dyn Write, file: &str) -> Result<()> {
        writeln!(output, "## File: {}", file)?;
        writeln!(output, "(Error reading file)")?;
        writeln!(output)?;
        Ok(())
    }

    fn write_bookmark_block(&mut self, output: &mut dyn Write, block: &BookmarkBlock<'_>) -> Result<()> {
        writeln!(
            output,
            "## Bookmarks: {} in {}",
            block.labels.join(", "),
            block.path
        )?;
        writeln!(output, "> Lines: {}-{}", block.first_line, block.last_line)?;
        writeln!(output, "```{}", block.language)?;
        writeln!(output, "{}", block.text)?;
        writeln!(output, "```")?;
        writeln!(output)?;
        Ok(())
    }

    fn write_bookmark_error(&mut self, output: &mut dyn Write, file: &str) -> Result<()> {
        writeln!(output, "## Bookmark File: {}", file)?;
        writeln!(output, "(Error reading file)")?;
        writeln!(output)?;
        Ok(())
    }
}
