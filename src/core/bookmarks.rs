//! Bookmark CRUD scoped to a (group, file) bucket
//!
//! The bookmark map stays sparse: a bucket exists only while it holds at
//! least one bookmark.

use super::store::GroupStore;
use super::types::{Bookmark, Group, new_id};
use crate::error::{GroupError, Result};

const SNIPPET_CHARS: usize = 20;

/// Partial update for an existing bookmark
#[derive(Debug, Clone, Default)]
pub struct BookmarkPatch {
    pub line: Option<usize>,
    pub character: Option<usize>,
    pub label: Option<String>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
}

pub fn create(line: usize, label: &str, character: usize, description: Option<&str>) -> Result<Bookmark> {
    let label = label.trim();
    if label.is_empty() {
        return Err(GroupError::EmptyLabel);
    }
    Ok(Bookmark {
        id: new_id(),
        line,
        character,
        label: label.to_string(),
        description: description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(String::from),
    })
}

/// Appends to the file's bucket, creating it when absent. A bookmark whose
/// id already exists in the bucket is given a fresh id.
pub fn add_to_group(group: &mut Group, file: &str, mut bookmark: Bookmark) -> String {
    let bucket = group.bookmarks.entry(file.to_string()).or_default();
    if bookmark.id.is_empty() || bucket.iter().any(|b| b.id == bookmark.id) {
        bookmark.id = new_id();
    }
    let id = bookmark.id.clone();
    bucket.push(bookmark);
    id
}

/// Applies `patch` to the matching bookmark. Missing group, file or id is a
/// no-op that returns `Ok(false)`.
pub fn update(group: &mut Group, file: &str, bookmark_id: &str, patch: BookmarkPatch) -> Result<bool> {
    if let Some(label) = &patch.label
        && label.trim().is_empty()
    {
        return Err(GroupError::EmptyLabel);
    }

    let Some(bookmark) = group
        .bookmarks
        .get_mut(file)
        .and_then(|bucket| bucket.iter_mut().find(|b| b.id == bookmark_id))
    else {
        return Ok(false);
    };

    if let Some(line) = patch.line {
        bookmark.line = line;
    }
    if let Some(character) = patch.character {
        bookmark.character = character;
    }
    if let Some(label) = patch.label {
        bookmark.label = label.trim().to_string();
    }
    if let Some(description) = patch.description {
        bookmark.description = description.filter(|d| !d.trim().is_empty());
    }
    Ok(true)
}

pub fn update_label(group: &mut Group, file: &str, bookmark_id: &str, label: &str) -> Result<bool> {
    update(
        group,
        file,
        bookmark_id,
        BookmarkPatch {
            label: Some(label.to_string()),
            ..Default::default()
        },
    )
}

/// Empty text clears the description.
pub fn update_description(group: &mut Group, file: &str, bookmark_id: &str, description: &str) -> Result<bool> {
    update(
        group,
        file,
        bookmark_id,
        BookmarkPatch {
            description: Some(Some(description.to_string())),
            ..Default::default()
        },
    )
}

/// Removes a bookmark, dropping the bucket when it empties.
pub fn remove(group: &mut Group, file: &str, bookmark_id: &str) -> bool {
    let Some(bucket) = group.bookmarks.get_mut(file) else {
        return false;
    };
    let before = bucket.len();
    bucket.retain(|b| b.id != bookmark_id);
    let removed = bucket.len() < before;
    if bucket.is_empty() {
        group.bookmarks.remove(file);
    }
    removed
}

pub fn find<'a>(group: &'a Group, file: &str, bookmark_id: &str) -> Option<&'a Bookmark> {
    group
        .bookmarks
        .get(file)?
        .iter()
        .find(|b| b.id == bookmark_id)
}

/// `Line N (snippet...)` from the 0-based line and its text.
pub fn smart_label(line: usize, line_text: &str) -> String {
    let trimmed = line_text.trim();
    let mut label = format!("Line {}", line + 1);
    if !trimmed.is_empty() {
        let snippet: String = if trimmed.chars().count() > SNIPPET_CHARS {
            let head: String = trimmed.chars().take(SNIPPET_CHARS).collect();
            format!("{}...", head)
        } else {
            trimmed.to_string()
        };
        label.push_str(&format!(" ({})", snippet));
    }
    label
}

/// The regular group to attach a bookmark for `file` to, when the choice is
/// unambiguous: the only regular group containing the file.
pub fn pick_target_group<'a>(store: &'a GroupStore, file: &str) -> Option<&'a Group> {
    let mut containing = store
        .iter()
        .filter(|g| !g.built_in && g.contains_file(file));
    let first = containing.next()?;
    match containing.next() {
        Some(_) => None,
        None => Some(first),
    }
}
