//! Session-scoped state shared across commands
//!
//! Owned by whoever dispatches commands and passed by reference into the
//! handlers that need it.

use super::hierarchy::Hierarchy;
use super::store::GroupStore;
use super::types::{FileRef, SelectionItem};
use crate::host::Workspace;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct Session {
    copied: Vec<SelectionItem>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn copied(&self) -> &[SelectionItem] {
        &self.copied
    }

    /// Remembers the items for a later paste and returns the plain-text
    /// rendering for the system clipboard: absolute paths for files and
    /// bookmarks, `[Group] name` for groups. `None` when nothing was given.
    pub fn copy<W: Workspace + ?Sized>(
        &mut self,
        store: &GroupStore,
        items: &[SelectionItem],
        workspace: &W,
    ) -> Option<String> {
        if items.is_empty() {
            return None;
        }
        self.copied = items.to_vec();

        let lines: Vec<String> = items
            .iter()
            .filter_map(|item| match item {
                SelectionItem::File { file, .. } | SelectionItem::Bookmark { file, .. } => {
                    Some(workspace.absolute_path(file))
                }
                SelectionItem::Group { group_id } => {
                    store.find(group_id).map(|g| format!("[Group] {}", g.name))
                }
            })
            .collect();
        Some(lines.join("\n"))
    }

    /// Adds every copied file reference to `target`, skipping ones already
    /// there. Returns how many were added.
    pub fn paste(&self, store: &mut GroupStore, target: &str) -> usize {
        if self.copied.is_empty() {
            return 0;
        }
        let Some(group) = store.find_mut(target) else {
            return 0;
        };
        if group.built_in {
            return 0;
        }

        let mut added = 0;
        for item in &self.copied {
            if let SelectionItem::File { file, .. } | SelectionItem::Bookmark { file, .. } = item
                && !group.contains_file(file)
            {
                group.files.push(file.clone());
                added += 1;
            }
        }
        added
    }

    pub fn clear(&mut self) {
        self.copied.clear();
    }
}

/// Files named by a selection: files and bookmarks contribute themselves,
/// groups contribute everything below them. First-seen order, no repeats.
pub fn selection_files(store: &GroupStore, items: &[SelectionItem]) -> Vec<FileRef> {
    let hierarchy = Hierarchy::new(store);
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    let mut push = |file: FileRef| {
        if seen.insert(file.clone()) {
            files.push(file);
        }
    };
    for item in items {
        match item {
            SelectionItem::Group { group_id } => {
                for file in hierarchy.collect_files(group_id) {
                    push(file);
                }
            }
            SelectionItem::File { file, .. } | SelectionItem::Bookmark { file, .. } => {
                push(file.clone())
            }
        }
    }
    files
}

fn join_unique(values: impl Iterator<Item = String>) -> Option<String> {
    let mut seen = HashSet::new();
    let lines: Vec<String> = values.filter(|v| seen.insert(v.clone())).collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Newline-joined base names, `None` when the selection names no files
pub fn copy_names<W: Workspace + ?Sized>(
    store: &GroupStore,
    items: &[SelectionItem],
    workspace: &W,
) -> Option<String> {
    join_unique(selection_files(store, items).iter().map(|f| {
        let absolute = workspace.absolute_path(f);
        Path::new(&absolute)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or(absolute)
    }))
}

pub fn copy_relative_paths<W: Workspace + ?Sized>(
    store: &GroupStore,
    items: &[SelectionItem],
    workspace: &W,
) -> Option<String> {
    join_unique(
        selection_files(store, items)
            .iter()
            .map(|f| workspace.display_path(f)),
    )
}

pub fn copy_absolute_paths<W: Workspace + ?Sized>(
    store: &GroupStore,
    items: &[SelectionItem],
    workspace: &W,
) -> Option<String> {
    join_unique(
        selection_files(store, items)
            .iter()
            .map(|f| workspace.absolute_path(f)),
    )
}

/// The group's own files as display paths, one per line
pub fn group_paths<W: Workspace + ?Sized>(store: &GroupStore, id: &str, workspace: &W) -> Option<String> {
    let group = store.find(id)?;
    if group.files.is_empty() {
        return None;
    }
    Some(
        group
            .files
            .iter()
            .map(|f| workspace.display_path(f))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}
