use crate::config::Config;
use crate::context::{ContextJob, ContextOutcome, Route, deliver, drive, plan};
use crate::core::{GroupStore, SelectionItem, bookmarks};
use crate::format::create_formatter;
use crate::fs::FsWorkspace;
use crate::host::{OutputSink, ProgressSink};
use crate::utils::clipboard::SystemOutput;
use anyhow::{Context, Result, anyhow, bail};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Parses a command-line selection item against the store.
///
/// `g:<group>`, `f:<group>:<file>` and `b:<group>:<file>:<bookmark>`. File
/// references may themselves contain `:`, so the bookmark id is split off
/// from the right.
pub fn parse_item(store: &GroupStore, arg: &str) -> Result<SelectionItem> {
    let (kind, rest) = arg
        .split_once(':')
        .with_context(|| format!("Invalid item '{}': expected g:, f: or b: prefix", arg))?;
    match kind {
        "g" => {
            if store.find(rest).is_none() {
                bail!("Unknown group '{}'", rest);
            }
            Ok(SelectionItem::group(rest))
        }
        "f" => {
            let (group_id, file) = rest
                .split_once(':')
                .with_context(|| format!("Invalid file item '{}'", arg))?;
            Ok(SelectionItem::file(group_id, file))
        }
        "b" => {
            let (group_id, rest) = rest
                .split_once(':')
                .with_context(|| format!("Invalid bookmark item '{}'", arg))?;
            let (file, bookmark_id) = rest
                .rsplit_once(':')
                .with_context(|| format!("Invalid bookmark item '{}'", arg))?;
            let group = store
                .find(group_id)
                .ok_or_else(|| anyhow!("Unknown group '{}'", group_id))?;
            let bookmark = bookmarks::find(group, file, bookmark_id)
                .ok_or_else(|| anyhow!("Unknown bookmark '{}' in {}", bookmark_id, file))?;
            Ok(SelectionItem::bookmark(group_id, file, bookmark.clone()))
        }
        other => bail!("Invalid item kind '{}' in '{}'", other, arg),
    }
}

/// Terminal progress for context generation.
///
/// Percent increments drive an indicatif bar. A one-shot command has no
/// cancel control, so runs under this sink always complete; hosts that can
/// cancel supply their own `ProgressSink`.
pub struct CliProgress {
    bar: ProgressBar,
    percent: f64,
}

impl CliProgress {
    pub fn new(visible: bool) -> Self {
        let bar = ProgressBar::new(100);
        if visible {
            if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}") {
                bar.set_style(style);
            }
        } else {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_message("Generating context...");
        Self { bar, percent: 0.0 }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for CliProgress {
    fn report(&mut self, increment: f64, message: Option<&str>) {
        self.percent = (self.percent + increment).min(100.0);
        self.bar.set_position(self.percent.round() as u64);
        if let Some(message) = message {
            self.bar.set_message(format!("Generating context... {}", message));
        }
    }

    fn is_cancelled(&self) -> bool {
        false
    }

    fn yield_now(&mut self) {
        self.bar.tick();
        std::thread::yield_now();
    }

    fn warn(&mut self, message: &str) {
        self.bar.suspend(|| eprintln!("Warning: {}", message));
    }
}

/// Summary of a context run for the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextReport {
    Clipboard { items: usize, bytes: usize },
    Document { items: usize, bytes: usize, language: String },
    Cancelled,
}

/// Builds the context artifact for `items` and delivers it.
pub fn run_context(
    config: &Config,
    store: &GroupStore,
    items: &[SelectionItem],
    progress: &mut dyn ProgressSink,
    output: &mut dyn OutputSink,
) -> Result<ContextReport> {
    let workspace = FsWorkspace::new(&config.root);
    let plan = plan(store, items, &workspace, &config.limits)?;
    log::debug!(
        "context plan: {} files, {} bookmark files from {} selected items",
        plan.files.len(),
        plan.bookmarks.len(),
        plan.selected
    );

    let job = ContextJob::new(
        plan,
        &workspace,
        create_formatter(config.output_format),
        config.limits.clone(),
    )?;

    let artifact = match drive(job, progress)? {
        ContextOutcome::Completed(artifact) => artifact,
        ContextOutcome::Cancelled => return Ok(ContextReport::Cancelled),
    };

    deliver(&artifact, output)?;
    let bytes = artifact.text.len();
    Ok(match artifact.route {
        Route::Clipboard => ContextReport::Clipboard {
            items: artifact.items,
            bytes,
        },
        Route::Document { language } => ContextReport::Document {
            items: artifact.items,
            bytes,
            language,
        },
    })
}

/// Command-line entry point for `context`: terminal progress, system
/// clipboard and the configured output file.
pub fn run(config: &Config, store: &GroupStore, items: &[SelectionItem]) -> Result<()> {
    let mut progress = CliProgress::new(!config.verbose);
    let mut output = SystemOutput::new(&config.output);
    let report = run_context(config, store, items, &mut progress, &mut output);
    progress.finish();

    match report? {
        ContextReport::Clipboard { items, bytes } => {
            println!("Copied context for {} items to clipboard ({} bytes).", items, bytes);
        }
        ContextReport::Document { items, bytes, .. } => {
            let path = output.written.unwrap_or_else(|| config.output.clone());
            println!(
                "Context for {} items is {} bytes, too large for the clipboard. Written to {:?}.",
                items, bytes, path
            );
        }
        ContextReport::Cancelled => println!("Context generation cancelled."),
    }
    Ok(())
}
