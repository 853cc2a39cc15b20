//! Step-wise artifact assembly, cancellation and output routing

use anyhow::Result;

use super::plan::{BookmarkRef, ContextPlan};
use super::ranges::{LineRange, merge_ranges};
use crate::config::ContextLimits;
use crate::core::extension_of;
use crate::format::{BookmarkBlock, Formatter};
use crate::host::{OutputSink, ProgressSink, Workspace};
use crate::utils::binary::{has_binary_extension, looks_binary};

/// Result of processing one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// One item handled; `done` of `total` finished so far
    Processed { done: usize, total: usize },
    /// Nothing left to process
    Finished,
}

/// Where a finished artifact goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Clipboard,
    Document { language: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub text: String,
    /// Untruncated count of selected items in the manifest
    pub items: usize,
    pub route: Route,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextOutcome {
    Completed(Artifact),
    /// Cancelled by the host; nothing was produced
    Cancelled,
}

/// Assembles the artifact one item per `step` call: every file-bucket entry
/// first, then every bookmark-bucket file.
pub struct ContextJob<'a, W: Workspace + ?Sized> {
    plan: ContextPlan,
    workspace: &'a W,
    formatter: Box<dyn Formatter>,
    limits: ContextLimits,
    buffer: Vec<u8>,
    cursor: usize,
}

impl<'a, W: Workspace + ?Sized> ContextJob<'a, W> {
    pub fn new(
        plan: ContextPlan,
        workspace: &'a W,
        mut formatter: Box<dyn Formatter>,
        limits: ContextLimits,
    ) -> Result<Self> {
        let mut buffer = Vec::new();
        formatter.write_manifest(&mut buffer, &plan.manifest)?;
        Ok(Self {
            plan,
            workspace,
            formatter,
            limits,
            buffer,
            cursor: 0,
        })
    }

    pub fn total(&self) -> usize {
        self.plan.total()
    }

    /// Items processed so far
    pub fn processed(&self) -> usize {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.total()
    }

    pub fn plan(&self) -> &ContextPlan {
        &self.plan
    }

    /// Processes the next item. Per-item read problems become placeholder
    /// sections; only formatter failures are returned as errors.
    pub fn step(&mut self) -> Result<Step> {
        let total = self.total();
        if self.cursor >= total {
            return Ok(Step::Finished);
        }

        let file_count = self.plan.files.len();
        if self.cursor < file_count {
            self.process_file(self.cursor)?;
        } else {
            self.process_bookmarks(self.cursor - file_count)?;
        }
        self.cursor += 1;

        Ok(Step::Processed {
            done: self.cursor,
            total,
        })
    }

    fn process_file(&mut self, index: usize) -> Result<()> {
        let Some((file, groups)) = self.plan.files.get_index(index) else {
            return Ok(());
        };

        if has_binary_extension(file, &self.limits) {
            log::debug!("skipping binary extension: {}", file);
            return Ok(());
        }

        let text = match self.workspace.read_text(file) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("failed to read {}: {:#}", file, e);
                return self.formatter.write_read_error(&mut self.buffer, file);
            }
        };

        if looks_binary(&text, self.limits.binary_probe_chars) {
            log::debug!("skipping binary content: {}", file);
            return Ok(());
        }

        let path = self.workspace.display_path(file);
        if text.len() > self.limits.max_file_bytes {
            return self.formatter.write_too_large(&mut self.buffer, &path);
        }

        let groups: Vec<String> = groups.iter().cloned().collect();
        self.formatter.write_file(
            &mut self.buffer,
            &path,
            &groups,
            &extension_of(file),
            &text,
        )
    }

    fn process_bookmarks(&mut self, index: usize) -> Result<()> {
        let Some((file, marks)) = self.plan.bookmarks.get_index(index) else {
            return Ok(());
        };

        let blocks = match excerpt_blocks(self.workspace, file, marks, self.limits.bookmark_radius) {
            Ok(blocks) => blocks,
            Err(e) => {
                log::warn!("failed to read bookmark file {}: {:#}", file, e);
                return self.formatter.write_bookmark_error(&mut self.buffer, file);
            }
        };

        let path = self.workspace.display_path(file);
        let language = extension_of(file);
        for (range, text) in blocks {
            let block = BookmarkBlock {
                path: &path,
                labels: &range.labels,
                first_line: range.start + 1,
                last_line: range.end + 1,
                language: &language,
                text: &text,
            };
            self.formatter.write_bookmark_block(&mut self.buffer, &block)?;
        }
        Ok(())
    }

    /// Consumes the job and decides the route for the finished text.
    pub fn finish(self) -> Artifact {
        let text = String::from_utf8_lossy(&self.buffer).into_owned();
        let route = if text.len() > self.limits.clipboard_threshold {
            Route::Document {
                language: self.formatter.document_language().to_string(),
            }
        } else {
            Route::Clipboard
        };
        Artifact {
            text,
            items: self.plan.manifest.total(),
            route,
        }
    }
}

/// Reads `file` and cuts one excerpt per merged bookmark window.
fn excerpt_blocks<W: Workspace + ?Sized>(
    workspace: &W,
    file: &str,
    marks: &[BookmarkRef],
    radius: usize,
) -> Result<Vec<(LineRange, String)>> {
    let text = workspace.read_text(file)?;
    let lines: Vec<&str> = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();
    let last_line = lines.len().saturating_sub(1);

    let windows = marks
        .iter()
        .map(|m| LineRange::around(m.line, radius, last_line, m.label.clone()))
        .collect();

    Ok(merge_ranges(windows)
        .into_iter()
        .map(|range| {
            let excerpt = lines[range.start..=range.end].join("\n");
            (range, excerpt)
        })
        .collect())
}

/// Runs `job` to completion under `progress`.
///
/// Cancellation is checked before every item; the host is yielded to
/// whenever the processed count is a multiple of `yield_every`. A cancelled
/// run returns no artifact at all.
pub fn drive<W, P>(mut job: ContextJob<'_, W>, progress: &mut P) -> Result<ContextOutcome>
where
    W: Workspace + ?Sized,
    P: ProgressSink + ?Sized,
{
    let total = job.total();
    if job.plan().selected > job.limits.warn_items {
        progress.warn(&format!(
            "{} items selected; the generated context may be large",
            job.plan().selected
        ));
    }

    let increment = if total == 0 { 100.0 } else { 100.0 / total as f64 };
    let yield_every = job.limits.yield_every.max(1);

    while !job.is_finished() {
        if progress.is_cancelled() {
            log::info!("context generation cancelled after {}/{} items", job.processed(), total);
            return Ok(ContextOutcome::Cancelled);
        }
        if job.processed() % yield_every == 0 {
            progress.yield_now();
        }
        if let Step::Processed { done, total } = job.step()? {
            progress.report(increment, Some(&format!("({}/{})", done, total)));
        }
    }

    Ok(ContextOutcome::Completed(job.finish()))
}

/// Sends a finished artifact where its route says.
pub fn deliver<S: OutputSink + ?Sized>(artifact: &Artifact, sink: &mut S) -> Result<()> {
    match &artifact.route {
        Route::Clipboard => sink.write_clipboard(&artifact.text),
        Route::Document { language } => sink.open_as_document(&artifact.text, language),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::plan::plan;
    use crate::core::{Bookmark, Group, GroupStore, SelectionItem};
    use crate::format::markdown::MarkdownFormatter;
    use anyhow::anyhow;
    use std::cell::Cell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryWorkspace {
        files: HashMap<String, String>,
    }

    impl MemoryWorkspace {
        fn with(mut self, name: &str, text: &str) -> Self {
            self.files.insert(name.to_string(), text.to_string());
            self
        }
    }

    impl Workspace for MemoryWorkspace {
        fn read_text(&self, file: &str) -> Result<String> {
            self.files
                .get(file)
                .cloned()
                .ok_or_else(|| anyhow!("no such file: {}", file))
        }

        fn display_path(&self, file: &str) -> String {
            file.trim_start_matches("/w/").to_string()
        }
    }

    #[derive(Default)]
    struct Recorder {
        reports: Vec<f64>,
        yields: usize,
        cancel_after: Option<usize>,
        warnings: Vec<String>,
    }

    impl ProgressSink for Recorder {
        fn report(&mut self, increment: f64, _message: Option<&str>) {
            self.reports.push(increment);
        }

        fn is_cancelled(&self) -> bool {
            self.cancel_after.is_some_and(|n| self.reports.len() >= n)
        }

        fn yield_now(&mut self) {
            self.yields += 1;
        }

        fn warn(&mut self, message: &str) {
            self.warnings.push(message.to_string());
        }
    }

    fn numbered(lines: usize) -> String {
        (1..=lines)
            .map(|i| format!("line {}", i))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn run(store: &GroupStore, items: &[SelectionItem], ws: &MemoryWorkspace, progress: &mut Recorder) -> ContextOutcome {
        let limits = ContextLimits::default();
        let plan = plan(store, items, ws, &limits).unwrap();
        let job = ContextJob::new(plan, ws, Box::new(MarkdownFormatter), limits).unwrap();
        drive(job, progress).unwrap()
    }

    fn completed(outcome: ContextOutcome) -> Artifact {
        match outcome {
            ContextOutcome::Completed(artifact) => artifact,
            ContextOutcome::Cancelled => panic!("unexpected cancellation"),
        }
    }

    fn group(id: &str, files: &[&str]) -> Group {
        Group {
            id: id.into(),
            name: id.to_uppercase(),
            files: files.iter().map(|f| f.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_skips_binary_and_degrades_errors() {
        let store = GroupStore::from_groups(vec![group(
            "g",
            &["/w/logo.png", "/w/blob.dat", "/w/missing.rs", "/w/ok.rs"],
        )]);
        let ws = MemoryWorkspace::default()
            .with("/w/logo.png", "should never be read")
            .with("/w/blob.dat", "abc\0def")
            .with("/w/ok.rs", "fn ok() {}");
        let mut progress = Recorder::default();
        let artifact = completed(run(&store, &[SelectionItem::group("g")], &ws, &mut progress));

        assert!(!artifact.text.contains("logo.png"));
        assert!(!artifact.text.contains("blob.dat"));
        assert!(artifact.text.contains("## File: /w/missing.rs\n(Error reading file)"));
        assert!(artifact.text.contains("## File: ok.rs\n> In Group: G\n```rs\nfn ok() {}\n```"));
        assert_eq!(progress.reports.len(), 4);
        assert!((progress.reports[0] - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_too_large_placeholder() {
        let store = GroupStore::from_groups(vec![group("g", &["/w/big.txt"])]);
        let ws = MemoryWorkspace::default().with("/w/big.txt", &"x".repeat(1024 * 1024 + 1));
        let artifact = completed(run(&store, &[SelectionItem::group("g")], &ws, &mut Recorder::default()));
        assert!(artifact.text.contains("## File: big.txt\n(File too large to include)"));
        assert_eq!(artifact.route, Route::Clipboard);
    }

    #[test]
    fn test_bookmark_windows_merge() {
        let store = GroupStore::from_groups(vec![group("g", &["/w/a.rs"])]);
        let ws = MemoryWorkspace::default().with("/w/a.rs", &numbered(60));
        let mark = |line: usize, label: &str| Bookmark {
            id: label.into(),
            line,
            character: 0,
            label: label.into(),
            description: None,
        };
        let items = vec![
            SelectionItem::bookmark("g", "/w/a.rs", mark(10, "first")),
            SelectionItem::bookmark("g", "/w/a.rs", mark(2, "top")),
            SelectionItem::bookmark("g", "/w/a.rs", mark(40, "far")),
            SelectionItem::bookmark("g", "/w/a.rs", mark(58, "end")),
        ];
        let artifact = completed(run(&store, &items, &ws, &mut Recorder::default()));

        // lines 0..=7 and 5..=15 merge, 35..=45 and 53..=59 stay apart
        assert!(artifact.text.contains("## Bookmarks: top, first in a.rs\n> Lines: 1-16\n```rs\nline 1\n"));
        assert!(artifact.text.contains("line 16\n```"));
        assert!(artifact.text.contains("## Bookmarks: far in a.rs\n> Lines: 36-46\n"));
        assert!(artifact.text.contains("## Bookmarks: end in a.rs\n> Lines: 54-60\n"));
        assert_eq!(artifact.text.matches("## Bookmarks:").count(), 3);
    }

    struct CountingWorkspace {
        inner: MemoryWorkspace,
        reads: Cell<usize>,
    }

    impl Workspace for CountingWorkspace {
        fn read_text(&self, file: &str) -> Result<String> {
            self.reads.set(self.reads.get() + 1);
            self.inner.read_text(file)
        }

        fn display_path(&self, file: &str) -> String {
            self.inner.display_path(file)
        }
    }

    #[test]
    fn test_bookmark_file_read_once() {
        let store = GroupStore::from_groups(vec![group("g", &[])]);
        let ws = CountingWorkspace {
            inner: MemoryWorkspace::default().with("/w/a.rs", &numbered(30)),
            reads: Cell::new(0),
        };
        let mark = |line: usize, label: &str| Bookmark {
            id: label.into(),
            line,
            character: 0,
            label: label.into(),
            description: None,
        };
        let items = vec![
            SelectionItem::bookmark("g", "/w/a.rs", mark(3, "one")),
            SelectionItem::bookmark("g", "/w/a.rs", mark(25, "two")),
        ];
        let limits = ContextLimits::default();
        let plan = plan(&store, &items, &ws, &limits).unwrap();
        let job = ContextJob::new(plan, &ws, Box::new(MarkdownFormatter), limits).unwrap();
        let artifact = completed(drive(job, &mut Recorder::default()).unwrap());

        assert_eq!(ws.reads.get(), 1);
        assert!(artifact.text.contains("## Bookmarks: two in a.rs\n> Lines: 21-30\n"));
    }

    #[test]
    fn test_bookmark_read_failure_placeholder() {
        let store = GroupStore::from_groups(vec![group("g", &[])]);
        let ws = MemoryWorkspace::default();
        let bm = Bookmark {
            id: "b".into(),
            line: 1,
            character: 0,
            label: "gone".into(),
            description: None,
        };
        let items = vec![SelectionItem::bookmark("g", "/w/gone.rs", bm)];
        let artifact = completed(run(&store, &items, &ws, &mut Recorder::default()));
        assert!(artifact.text.contains("## Bookmark File: /w/gone.rs\n(Error reading file)"));
    }

    #[test]
    fn test_cancel_discards_everything() {
        let files: Vec<String> = (0..8).map(|i| format!("/w/f{}.rs", i)).collect();
        let refs: Vec<&str> = files.iter().map(String::as_str).collect();
        let store = GroupStore::from_groups(vec![group("g", &refs)]);
        let mut ws = MemoryWorkspace::default();
        for f in &files {
            ws = ws.with(f, "content");
        }
        let mut progress = Recorder {
            cancel_after: Some(3),
            ..Default::default()
        };
        let outcome = run(&store, &[SelectionItem::group("g")], &ws, &mut progress);
        assert_eq!(outcome, ContextOutcome::Cancelled);
        assert_eq!(progress.reports.len(), 3);
    }

    #[test]
    fn test_yields_every_five_items() {
        let files: Vec<String> = (0..12).map(|i| format!("/w/f{}.rs", i)).collect();
        let refs: Vec<&str> = files.iter().map(String::as_str).collect();
        let store = GroupStore::from_groups(vec![group("g", &refs)]);
        let mut ws = MemoryWorkspace::default();
        for f in &files {
            ws = ws.with(f, "content");
        }
        let mut progress = Recorder::default();
        completed(run(&store, &[SelectionItem::group("g")], &ws, &mut progress));
        // before items 0, 5 and 10
        assert_eq!(progress.yields, 3);
        assert_eq!(progress.reports.len(), 12);
    }

    #[test]
    fn test_large_selection_warns_but_proceeds() {
        let files: Vec<String> = (0..21).map(|i| format!("/w/f{}.rs", i)).collect();
        let refs: Vec<&str> = files.iter().map(String::as_str).collect();
        let store = GroupStore::from_groups(vec![group("g", &refs)]);
        let mut ws = MemoryWorkspace::default();
        for f in &files {
            ws = ws.with(f, "content");
        }
        let items: Vec<SelectionItem> = files.iter().map(|f| SelectionItem::file("g", f.as_str())).collect();
        let mut progress = Recorder::default();
        let artifact = completed(run(&store, &items, &ws, &mut progress));
        assert_eq!(progress.warnings.len(), 1);
        assert_eq!(artifact.items, 21);
        assert!(artifact.text.contains("- ... and 6 more"));
    }

    #[derive(Default)]
    struct Sink {
        clipboard: Option<String>,
        document: Option<(String, String)>,
    }

    impl OutputSink for Sink {
        fn write_clipboard(&mut self, text: &str) -> Result<()> {
            self.clipboard = Some(text.to_string());
            Ok(())
        }

        fn open_as_document(&mut self, text: &str, language: &str) -> Result<()> {
            self.document = Some((text.to_string(), language.to_string()));
            Ok(())
        }
    }

    #[test]
    fn test_deliver_follows_route() {
        let mut sink = Sink::default();
        let artifact = Artifact {
            text: "small".into(),
            items: 1,
            route: Route::Clipboard,
        };
        deliver(&artifact, &mut sink).unwrap();
        assert_eq!(sink.clipboard.as_deref(), Some("small"));

        let artifact = Artifact {
            text: "big".into(),
            items: 1,
            route: Route::Document {
                language: "markdown".into(),
            },
        };
        deliver(&artifact, &mut sink).unwrap();
        assert_eq!(sink.document, Some(("big".to_string(), "markdown".to_string())));
    }
}
