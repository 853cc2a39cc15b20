//! Selection expansion for context aggregation

use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;

use super::manifest::{Manifest, ManifestEntry};
use crate::config::ContextLimits;
use crate::core::{FileRef, GroupStore, Hierarchy, SelectionItem};
use crate::error::{GroupError, Result};
use crate::host::Workspace;

/// A bookmark excerpt request: the line to centre on and its label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkRef {
    pub line: usize,
    pub label: String,
}

/// Work derived from a selection, ready for `ContextJob`
#[derive(Debug, Clone)]
pub struct ContextPlan {
    pub manifest: Manifest,
    /// Whole files to include, each with the group paths that contributed it
    pub files: IndexMap<FileRef, IndexSet<String>>,
    /// Files to excerpt around bookmarks, independent of `files`
    pub bookmarks: IndexMap<FileRef, Vec<BookmarkRef>>,
    /// Items selected before expansion
    pub selected: usize,
}

impl ContextPlan {
    /// Number of progress-tracked items
    pub fn total(&self) -> usize {
        self.files.len() + self.bookmarks.len()
    }
}

/// Expands `items` into file and bookmark buckets plus the manifest.
///
/// Groups expand to every file below them; a file reached through several
/// selected groups records each group path. A file also selected on its own
/// stays a single file-bucket entry and is flagged as deduplicated in the
/// manifest. Bookmarks always get their own bucket.
pub fn plan<W: Workspace + ?Sized>(
    store: &GroupStore,
    items: &[SelectionItem],
    workspace: &W,
    limits: &ContextLimits,
) -> Result<ContextPlan> {
    if items.is_empty() {
        return Err(GroupError::EmptySelection);
    }

    let hierarchy = Hierarchy::new(store).with_max_depth(limits.max_group_depth);
    let mut files: IndexMap<FileRef, IndexSet<String>> = IndexMap::new();
    let mut bookmarks: IndexMap<FileRef, Vec<BookmarkRef>> = IndexMap::new();
    let mut group_lines = Vec::new();
    let mut item_lines = Vec::new();
    let mut grouped: HashSet<FileRef> = HashSet::new();

    for item in items {
        match item {
            SelectionItem::Group { group_id } => {
                let Some(group) = store.find(group_id) else {
                    log::debug!("selected group {} no longer exists", group_id);
                    continue;
                };
                let label = hierarchy.group_path(group_id).unwrap_or_default();
                for file in hierarchy.collect_files(group_id) {
                    grouped.insert(file.clone());
                    files.entry(file).or_default().insert(label.clone());
                }
                group_lines.push(ManifestEntry::Group {
                    name: group.name.clone(),
                });
            }
            SelectionItem::File { group_id, file } => {
                let labels = files.entry(file.clone()).or_default();
                if let Some(label) = hierarchy.group_path(group_id) {
                    labels.insert(label);
                }
            }
            SelectionItem::Bookmark { file, bookmark, .. } => {
                bookmarks.entry(file.clone()).or_default().push(BookmarkRef {
                    line: bookmark.line,
                    label: bookmark.label.clone(),
                });
            }
        }
    }

    // Deduplication flags need every group expanded first.
    for item in items {
        match item {
            SelectionItem::Group { .. } => {}
            SelectionItem::File { file, .. } => item_lines.push(ManifestEntry::File {
                path: workspace.display_path(file),
                deduplicated: grouped.contains(file),
            }),
            SelectionItem::Bookmark { file, bookmark, .. } => {
                item_lines.push(ManifestEntry::Bookmark {
                    path: workspace.display_path(file),
                    line: bookmark.line,
                    label: bookmark.label.clone(),
                })
            }
        }
    }

    let plan = ContextPlan {
        manifest: Manifest::new(
            group_lines.into_iter().chain(item_lines).collect(),
            limits.manifest_lines,
        ),
        files,
        bookmarks,
        selected: items.len(),
    };

    if plan.total() == 0 {
        return Err(GroupError::NothingToInclude);
    }
    Ok(plan)
}
