//! Capabilities the core borrows from its host environment
//!
//! The core never touches the clipboard, editor or disk directly; it is
//! handed implementations of these traits.

use anyhow::Result;

/// Read access to file references
pub trait Workspace {
    fn read_text(&self, file: &str) -> Result<String>;

    /// Line count as an editor reports it: a trailing newline opens one more
    /// (empty) line.
    fn line_count(&self, file: &str) -> Result<usize> {
        Ok(self.read_text(file)?.split('\n').count())
    }

    /// Relative path for presentation
    fn display_path(&self, file: &str) -> String;

    /// Absolute file-system path for the reference
    fn absolute_path(&self, file: &str) -> String {
        file.to_string()
    }

    /// Modification time in seconds since the epoch, 0 when unknown
    fn modified(&self, _file: &str) -> u64 {
        0
    }
}

/// Destinations for a finished artifact
pub trait OutputSink {
    fn write_clipboard(&mut self, text: &str) -> Result<()>;
    fn open_as_document(&mut self, text: &str, language: &str) -> Result<()>;
}

/// Progress reporting, cooperative cancellation and yielding
pub trait ProgressSink {
    /// `increment` is in percent of the whole run.
    fn report(&mut self, increment: f64, message: Option<&str>);

    fn is_cancelled(&self) -> bool;

    /// Hands control back to the host's event loop.
    fn yield_now(&mut self) {}

    /// Non-blocking notice shown to the user.
    fn warn(&mut self, message: &str) {
        log::warn!("{}", message);
    }
}

/// A progress sink that ignores reports and is never cancelled
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _increment: f64, _message: Option<&str>) {}

    fn is_cancelled(&self) -> bool {
        false
    }
}
