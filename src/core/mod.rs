//! Group model for tabgroups
//!
//! Flat group records, hierarchy resolution, sorting, bookmarks, selection
//! resolution and the structural commands built on them.

pub mod bookmarks;
pub mod commands;
pub mod hierarchy;
pub mod selection;
pub mod session;
pub mod sort;
pub mod store;
mod types;

pub use hierarchy::Hierarchy;
pub use selection::{ResolvedSelection, SelectionSource, resolve_selection};
pub use session::Session;
pub use sort::sort_entries;
pub use store::{Direction, GroupStore};
pub use types::*;
