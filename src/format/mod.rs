//! Output format modules for context artifacts

pub mod markdown;
pub mod plain;

use anyhow::Result;
use std::io::Write;

use crate::config::OutputFormat;
use crate::context::manifest::Manifest;

/// A bookmark excerpt ready to be written
pub struct BookmarkBlock<'a> {
    pub path: &'a str,
    pub labels: &'a [String],
    /// One-based, inclusive
    pub first_line: usize,
    pub last_line: usize,
    pub language: &'a str,
    pub text: &'a str,
}

pub trait Formatter {
    /// Language hint used when the artifact opens as a document
    fn document_language(&self) -> &'static str;

    fn write_manifest(&mut self, output: &mut dyn Write, manifest: &Manifest) -> Result<()>;

    fn write_file(
        &mut self,
        output: &mut dyn Write,
        path: &str,
        group_paths: &[String],
        language: &str,
        content: &str,
    ) -> Result<()>;

    fn write_too_large(&mut self, output: &mut dyn Write, path: &str) -> Result<()>;

    fn write_read_error(&mut self, output: &mut dyn Write, file: &str) -> Result<()>;

    fn write_bookmark_block(&mut self, output: &mut dyn Write, block: &BookmarkBlock<'_>) -> Result<()>;

    fn write_bookmark_error(&mut self, output: &mut dyn Write, file: &str) -> Result<()>;
}

pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Markdown => Box::new(markdown::MarkdownFormatter),
        OutputFormat::Plain => Box::new(plain::PlainFormatter),
    }
}
