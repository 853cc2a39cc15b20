//! Context aggregation
//!
//! Turns a resolved selection of groups, files and bookmarks into one text
//! artifact. `plan` expands the selection, `ContextJob` processes one item
//! per step, and `drive` runs the steps under a progress sink that can
//! cancel and is yielded to on a fixed cadence.

pub mod job;
pub mod manifest;
pub mod plan;
pub mod ranges;

pub use job::{Artifact, ContextJob, ContextOutcome, Route, Step, deliver, drive};
pub use manifest::{Manifest, ManifestEntry};
pub use plan::{BookmarkRef, ContextPlan, plan};
pub use ranges::{LineRange, merge_ranges};
