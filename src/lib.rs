pub mod config;
pub mod context;
pub mod core;
pub mod error;
pub mod format;
pub mod fs;
pub mod host;
pub mod persist;
pub mod runner;
pub mod utils;

// Re-export key items for convenience
pub use config::{Config, ContextLimits, OutputFormat};
pub use context::{Artifact, ContextJob, ContextOutcome, Route, deliver, drive};
pub use core::{Group, GroupStore, SelectionItem};
pub use error::GroupError;
pub use runner::{parse_item, run, run_context};
