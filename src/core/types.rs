//! Core types shared across tabgroups modules

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque group identifier. Assigned once, never reused.
pub type GroupId = String;

/// Canonical file reference (a `file://` URI or a plain path).
pub type FileRef = String;

/// Generates a fresh unique identifier for groups and bookmarks.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Key used to order the files of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    None,
    Name,
    Path,
    Extension,
    Modified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// A labeled line/column anchor inside a file, scoped to one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    /// Unique within its (group, file) bucket
    pub id: String,
    /// Zero-based line
    pub line: usize,
    /// Zero-based column
    #[serde(default)]
    pub character: usize,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A named, optionally nested bucket of file references and bookmarks.
///
/// The positional index of a group is not stored here; it is whatever slot
/// the group currently occupies in the store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default)]
    pub id: GroupId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_group_id: Option<GroupId>,
    #[serde(default)]
    pub files: Vec<FileRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bookmarks: BTreeMap<FileRef, Vec<Bookmark>>,
    #[serde(default, skip_serializing_if = "is_default_sort_key")]
    pub sort_by: SortKey,
    #[serde(default, skip_serializing_if = "is_default_sort_order")]
    pub sort_order: SortOrder,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub built_in: bool,
}

fn is_default_sort_key(key: &SortKey) -> bool {
    *key == SortKey::None
}

fn is_default_sort_order(order: &SortOrder) -> bool {
    *order == SortOrder::Asc
}

impl Group {
    /// Creates a root-level regular group with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent: impl Into<GroupId>) -> Self {
        self.parent_group_id = Some(parent.into());
        self
    }

    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<FileRef>,
    {
        for file in files {
            let file = file.into();
            if !self.files.contains(&file) {
                self.files.push(file);
            }
        }
        self
    }

    pub fn contains_file(&self, file: &str) -> bool {
        self.files.iter().any(|f| f == file)
    }
}

/// One item of a selection. Every bulk operation matches on the tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionItem {
    Group {
        group_id: GroupId,
    },
    File {
        group_id: GroupId,
        file: FileRef,
    },
    Bookmark {
        group_id: GroupId,
        file: FileRef,
        bookmark: Bookmark,
    },
}

/// Identity of a selection item, used for deduplication
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectionKey {
    Group(GroupId),
    File(GroupId, FileRef),
    Bookmark(GroupId, FileRef, String),
}

impl SelectionItem {
    pub fn group(group_id: impl Into<GroupId>) -> Self {
        SelectionItem::Group {
            group_id: group_id.into(),
        }
    }

    pub fn file(group_id: impl Into<GroupId>, file: impl Into<FileRef>) -> Self {
        SelectionItem::File {
            group_id: group_id.into(),
            file: file.into(),
        }
    }

    pub fn bookmark(
        group_id: impl Into<GroupId>,
        file: impl Into<FileRef>,
        bookmark: Bookmark,
    ) -> Self {
        SelectionItem::Bookmark {
            group_id: group_id.into(),
            file: file.into(),
            bookmark,
        }
    }

    pub fn key(&self) -> SelectionKey {
        match self {
            SelectionItem::Group { group_id } => SelectionKey::Group(group_id.clone()),
            SelectionItem::File { group_id, file } => {
                SelectionKey::File(group_id.clone(), file.clone())
            }
            SelectionItem::Bookmark {
                group_id,
                file,
                bookmark,
            } => SelectionKey::Bookmark(group_id.clone(), file.clone(), bookmark.id.clone()),
        }
    }

    pub fn group_id(&self) -> &str {
        match self {
            SelectionItem::Group { group_id }
            | SelectionItem::File { group_id, .. }
            | SelectionItem::Bookmark { group_id, .. } => group_id,
        }
    }
}

impl fmt::Display for SelectionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionItem::Group { group_id } => write!(f, "group {}", group_id),
            SelectionItem::File { file, .. } => write!(f, "file {}", file),
            SelectionItem::Bookmark { file, bookmark, .. } => {
                write!(f, "bookmark {} at {}:{}", bookmark.label, file, bookmark.line + 1)
            }
        }
    }
}

/// Metadata the sort engine orders by
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileEntry {
    pub file: FileRef,
    /// Full path used for `path` ordering
    pub path: String,
    /// Seconds since the epoch; 0 when unknown
    pub modified: u64,
}

impl FileEntry {
    pub fn new(file: impl Into<FileRef>, path: impl Into<String>, modified: u64) -> Self {
        Self {
            file: file.into(),
            path: path.into(),
            modified,
        }
    }

    /// Basename of the entry's path
    pub fn name(&self) -> &str {
        self.path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.path.as_str())
    }

    /// Lowercased extension without the dot, empty when there is none
    pub fn extension(&self) -> String {
        extension_of(self.name())
    }
}

/// Lowercased extension of a path or file reference, without the dot.
pub fn extension_of(path: &str) -> String {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    }
}
