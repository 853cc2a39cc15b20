//! Structural group commands
//!
//! Each command mutates the store in one go; nothing partial is observable
//! between its start and end. Missing ids are no-ops.

use super::hierarchy::Hierarchy;
use super::sort::sort_entries;
use super::store::{Direction, GroupStore};
use super::bookmarks;
use super::types::{Bookmark, FileEntry, FileRef, Group, GroupId, SortKey, SortOrder, extension_of};
use crate::error::{GroupError, Result};
use crate::host::Workspace;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

const BUILT_IN_BASE_NAME: &str = "Built-in";
const NO_EXTENSION_NAME: &str = "(no extension)";

lazy_static! {
    static ref COPY_SUFFIX: Regex = Regex::new(r"\s*Copy( \d+)?$").unwrap();
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(GroupError::EmptyName);
    }
    Ok(trimmed.to_string())
}

fn ensure_mutable(group: &Group) -> Result<()> {
    if group.built_in {
        return Err(GroupError::BuiltInGroup(group.name.clone()));
    }
    Ok(())
}

pub fn add_group(store: &mut GroupStore, name: &str) -> Result<GroupId> {
    let name = validate_name(name)?;
    Ok(store.insert(Group::new(name)))
}

/// Adds a child under `parent_id`. A missing parent yields `Ok(None)`.
pub fn add_sub_group(store: &mut GroupStore, parent_id: &str, name: &str) -> Result<Option<GroupId>> {
    let name = validate_name(name)?;
    if store.find(parent_id).is_none() {
        return Ok(None);
    }
    Ok(Some(store.insert(Group::new(name).with_parent(parent_id))))
}

/// Returns `Ok(true)` when the name actually changed.
pub fn rename_group(store: &mut GroupStore, id: &str, name: &str) -> Result<bool> {
    let name = validate_name(name)?;
    let Some(group) = store.find_mut(id) else {
        return Ok(false);
    };
    ensure_mutable(group)?;
    if group.name == name {
        return Ok(false);
    }
    group.name = name;
    Ok(true)
}

/// `"<base> Copy"`, then `"<base> Copy 2"`, `"<base> Copy 3"`… until the
/// name is unused in the store.
pub fn copy_name(store: &GroupStore, base: &str) -> String {
    let base = COPY_SUFFIX.replace(base, "");
    let mut index = 1;
    let mut name = format!("{} Copy", base);
    while store.name_taken(&name) {
        index += 1;
        name = format!("{} Copy {}", base, index);
    }
    name
}

/// Copies a regular group's files into a new root-level group.
/// Built-in groups go through `duplicate_built_in` instead.
pub fn duplicate_group(store: &mut GroupStore, id: &str) -> Option<GroupId> {
    let source = store.find(id).filter(|g| !g.built_in)?;
    let name = copy_name(store, &source.name);
    let copy = Group::new(name).with_files(source.files.iter().cloned());
    Some(store.insert(copy))
}

/// Snapshots a built-in group's current files into a regular group. Later
/// refreshes of the built-in group do not touch the copy.
pub fn duplicate_built_in(store: &mut GroupStore, id: &str) -> Option<GroupId> {
    let source = store.find(id).filter(|g| g.built_in)?;
    let files = source.files.clone();
    let name = copy_name(store, BUILT_IN_BASE_NAME);
    Some(store.insert(Group::new(name).with_files(files)))
}

/// Removes one group. Its children are left in place and resolve as roots.
pub fn remove_group(store: &mut GroupStore, id: &str) -> Option<Group> {
    store.remove_by_id(id)
}

pub fn remove_group_at(store: &mut GroupStore, index: usize) -> Option<Group> {
    store.remove_at(index)
}

/// Removes several groups by id, returning how many existed.
pub fn remove_groups(store: &mut GroupStore, ids: &[GroupId]) -> usize {
    ids.iter()
        .filter(|id| store.remove_by_id(id).is_some())
        .count()
}

/// Swaps the group with its previous/next sibling (same resolved parent) in
/// store order.
pub fn move_group(store: &mut GroupStore, id: &str, direction: Direction) -> bool {
    let Some(index) = store.index_of(id) else {
        return false;
    };
    let parent = store
        .get(index)
        .and_then(|g| store.parent_of(g))
        .map(|p| p.id.clone());

    let siblings: Vec<usize> = store
        .iter()
        .enumerate()
        .filter(|(_, g)| store.parent_of(g).map(|p| p.id.clone()) == parent)
        .map(|(i, _)| i)
        .collect();

    let Some(pos) = siblings.iter().position(|&i| i == index) else {
        return false;
    };
    let neighbour = match direction {
        Direction::Up => pos.checked_sub(1).map(|p| siblings[p]),
        Direction::Down => siblings.get(pos + 1).copied(),
    };
    match neighbour {
        Some(other) => store.swap(index, other),
        None => false,
    }
}

/// Appends files not already present; returns how many were added.
pub fn add_files<I, S>(store: &mut GroupStore, id: &str, files: I) -> Result<usize>
where
    I: IntoIterator<Item = S>,
    S: Into<FileRef>,
{
    let Some(group) = store.find_mut(id) else {
        return Ok(0);
    };
    ensure_mutable(group)?;
    let mut added = 0;
    for file in files {
        let file = file.into();
        if !group.contains_file(&file) {
            group.files.push(file);
            added += 1;
        }
    }
    Ok(added)
}

/// Attaches `bookmark` to `file` in a regular group, adding the file to the
/// group first when it is not there yet. Returns the stored bookmark id, or
/// `Ok(None)` for a missing group.
pub fn add_bookmark(store: &mut GroupStore, id: &str, file: &str, bookmark: Bookmark) -> Result<Option<String>> {
    let Some(group) = store.find_mut(id) else {
        return Ok(None);
    };
    ensure_mutable(group)?;
    if !group.contains_file(file) {
        group.files.push(file.to_string());
    }
    Ok(Some(bookmarks::add_to_group(group, file, bookmark)))
}

/// Removes files and their bookmark buckets; returns how many were removed.
pub fn remove_files(store: &mut GroupStore, id: &str, files: &[FileRef]) -> Result<usize> {
    let Some(group) = store.find_mut(id) else {
        return Ok(0);
    };
    ensure_mutable(group)?;
    let before = group.files.len();
    group.files.retain(|f| !files.contains(f));
    for file in files {
        group.bookmarks.remove(file);
    }
    Ok(before - group.files.len())
}

pub fn set_sort(store: &mut GroupStore, id: &str, key: SortKey, order: SortOrder) -> bool {
    match store.find_mut(id) {
        Some(group) => {
            group.sort_by = key;
            group.sort_order = order;
            true
        }
        None => false,
    }
}

/// Flips the order of an active sort; no-op when the group is unsorted.
pub fn toggle_sort_order(store: &mut GroupStore, id: &str) -> bool {
    match store.find_mut(id) {
        Some(group) if group.sort_by != SortKey::None => {
            group.sort_order = group.sort_order.toggled();
            true
        }
        _ => false,
    }
}

pub fn clear_sort(store: &mut GroupStore, id: &str) -> bool {
    set_sort(store, id, SortKey::None, SortOrder::Asc)
}

/// Replaces every built-in group with one built-in group per extension.
/// Groups go to the front of the store ordered by extension; files keep
/// first-seen order.
pub fn refresh_extension_groups(store: &mut GroupStore, files: &[FileRef]) -> usize {
    let mut by_ext: BTreeMap<String, Vec<FileRef>> = BTreeMap::new();
    for file in files {
        let bucket = by_ext.entry(extension_of(file)).or_default();
        if !bucket.contains(file) {
            bucket.push(file.clone());
        }
    }

    store.retain(|g| !g.built_in);
    let count = by_ext.len();
    for (index, (ext, files)) in by_ext.into_iter().enumerate() {
        let name = if ext.is_empty() {
            NO_EXTENSION_NAME.to_string()
        } else {
            format!(".{}", ext)
        };
        let mut group = Group::new(name).with_files(files);
        group.built_in = true;
        store.insert_at(index, group);
    }
    log::debug!("refreshed {} extension groups", count);
    count
}

/// The group's own files ordered by its sort preference.
pub fn sorted_files<W: Workspace + ?Sized>(store: &GroupStore, id: &str, workspace: &W) -> Vec<FileRef> {
    let Some(group) = store.find(id) else {
        return Vec::new();
    };
    if group.sort_by == SortKey::None {
        return group.files.clone();
    }
    let entries = group
        .files
        .iter()
        .map(|f| FileEntry::new(f.clone(), workspace.absolute_path(f), workspace.modified(f)))
        .collect();
    sort_entries(entries, group.sort_by, group.sort_order)
        .into_iter()
        .map(|e| e.file)
        .collect()
}

/// Every file of the group and its descendants, in collection order.
pub fn all_files(store: &GroupStore, id: &str) -> Vec<FileRef> {
    Hierarchy::new(store).collect_files(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(store: &GroupStore) -> Vec<String> {
        store.iter().map(|g| g.name.clone()).collect()
    }

    #[test]
    fn test_add_group_validates() {
        let mut store = GroupStore::new();
        assert!(matches!(add_group(&mut store, "  "), Err(GroupError::EmptyName)));
        assert!(store.is_empty());
        let id = add_group(&mut store, " Api ").unwrap();
        assert_eq!(store.find(&id).unwrap().name, "Api");
    }

    #[test]
    fn test_add_sub_group_missing_parent() {
        let mut store = GroupStore::new();
        assert_eq!(add_sub_group(&mut store, "nope", "child").unwrap(), None);
        let parent = add_group(&mut store, "p").unwrap();
        let child = add_sub_group(&mut store, &parent, "child").unwrap().unwrap();
        assert_eq!(
            store.find(&child).unwrap().parent_group_id.as_deref(),
            Some(parent.as_str())
        );
    }

    #[test]
    fn test_copy_naming() {
        let mut store = GroupStore::new();
        let id = add_group(&mut store, "Api").unwrap();
        add_files(&mut store, &id, ["a.rs"]).unwrap();

        let first = duplicate_group(&mut store, &id).unwrap();
        assert_eq!(store.find(&first).unwrap().name, "Api Copy");
        assert_eq!(store.find(&first).unwrap().files, vec!["a.rs"]);

        let second = duplicate_group(&mut store, &first).unwrap();
        assert_eq!(store.find(&second).unwrap().name, "Api Copy 2");

        let third = duplicate_group(&mut store, &second).unwrap();
        assert_eq!(store.find(&third).unwrap().name, "Api Copy 3");
    }

    #[test]
    fn test_built_in_rejects_mutation() {
        let mut store = GroupStore::new();
        refresh_extension_groups(&mut store, &["a.rs".to_string()]);
        let id = store.get(0).unwrap().id.clone();

        assert!(matches!(
            rename_group(&mut store, &id, "x"),
            Err(GroupError::BuiltInGroup(_))
        ));
        assert!(add_files(&mut store, &id, ["b.rs"]).is_err());
        assert!(remove_files(&mut store, &id, &["a.rs".to_string()]).is_err());
        assert!(duplicate_group(&mut store, &id).is_none());
    }

    #[test]
    fn test_add_bookmark_respects_built_in() {
        let mut store = GroupStore::new();
        refresh_extension_groups(&mut store, &["a.rs".to_string()]);
        let built_in = store.get(0).unwrap().id.clone();
        let mark = bookmarks::create(0, "entry", 0, None).unwrap();

        assert!(matches!(
            add_bookmark(&mut store, &built_in, "b.rs", mark.clone()),
            Err(GroupError::BuiltInGroup(_))
        ));
        let untouched = store.find(&built_in).unwrap();
        assert_eq!(untouched.files, vec!["a.rs"]);
        assert!(untouched.bookmarks.is_empty());

        let regular = add_group(&mut store, "Api").unwrap();
        let stored = add_bookmark(&mut store, &regular, "b.rs", mark).unwrap().unwrap();
        let group = store.find(&regular).unwrap();
        assert_eq!(group.files, vec!["b.rs"]);
        assert!(bookmarks::find(group, "b.rs", &stored).is_some());

        let again = bookmarks::create(3, "later", 0, None).unwrap();
        assert_eq!(add_bookmark(&mut store, "gone", "b.rs", again).unwrap(), None);
    }

    #[test]
    fn test_duplicate_built_in_is_snapshot() {
        let mut store = GroupStore::new();
        refresh_extension_groups(&mut store, &["a.rs".to_string()]);
        let built_in = store.get(0).unwrap().id.clone();

        let copy = duplicate_built_in(&mut store, &built_in).unwrap();
        assert_eq!(store.find(&copy).unwrap().name, "Built-in Copy");
        assert!(!store.find(&copy).unwrap().built_in);

        refresh_extension_groups(&mut store, &["a.rs".to_string(), "b.rs".to_string()]);
        assert_eq!(store.find(&copy).unwrap().files, vec!["a.rs"]);
        assert!(add_files(&mut store, &copy, ["c.rs"]).is_ok());
    }

    #[test]
    fn test_remove_files_prunes_bookmarks() {
        let mut store = GroupStore::new();
        let id = add_group(&mut store, "g").unwrap();
        add_files(&mut store, &id, ["a.rs", "b.rs", "a.rs"]).unwrap();
        let group = store.find_mut(&id).unwrap();
        bookmarks::add_to_group(group, "a.rs", bookmarks::create(1, "x", 0, None).unwrap());

        let removed = remove_files(&mut store, &id, &["a.rs".to_string()]).unwrap();
        assert_eq!(removed, 1);
        let group = store.find(&id).unwrap();
        assert_eq!(group.files, vec!["b.rs"]);
        assert!(group.bookmarks.is_empty());
    }

    #[test]
    fn test_move_group_within_siblings() {
        let mut store = GroupStore::new();
        let a = add_group(&mut store, "a").unwrap();
        let child = add_sub_group(&mut store, &a, "child").unwrap().unwrap();
        let b = add_group(&mut store, "b").unwrap();

        // "b" skips over the child of "a" to swap with its sibling "a"
        assert!(move_group(&mut store, &b, Direction::Up));
        assert_eq!(names(&store), vec!["b", "child", "a"]);
        assert!(!move_group(&mut store, &child, Direction::Up));
        assert!(!move_group(&mut store, &b, Direction::Up));
    }

    #[test]
    fn test_sort_preferences() {
        let mut store = GroupStore::new();
        let id = add_group(&mut store, "g").unwrap();
        assert!(!toggle_sort_order(&mut store, &id));
        assert!(set_sort(&mut store, &id, SortKey::Name, SortOrder::Asc));
        assert!(toggle_sort_order(&mut store, &id));
        assert_eq!(store.find(&id).unwrap().sort_order, SortOrder::Desc);
        assert!(clear_sort(&mut store, &id));
        assert_eq!(store.find(&id).unwrap().sort_by, SortKey::None);
        assert!(!set_sort(&mut store, "nope", SortKey::Name, SortOrder::Asc));
    }

    #[test]
    fn test_refresh_extension_groups_replaces() {
        let mut store = GroupStore::new();
        add_group(&mut store, "mine").unwrap();
        let files: Vec<FileRef> = ["b.rs", "Makefile", "a.md", "c.rs"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(refresh_extension_groups(&mut store, &files), 3);
        assert_eq!(names(&store), vec!["(no extension)", ".md", ".rs", "mine"]);
        assert_eq!(store.get(2).unwrap().files, vec!["b.rs", "c.rs"]);

        refresh_extension_groups(&mut store, &files[..1]);
        assert_eq!(names(&store), vec![".rs", "mine"]);
    }

    #[test]
    fn test_remove_group_orphans_children() {
        let mut store = GroupStore::new();
        let a = add_group(&mut store, "a").unwrap();
        let child = add_sub_group(&mut store, &a, "child").unwrap().unwrap();
        assert!(remove_group(&mut store, &a).is_some());
        assert_eq!(store.roots().next().unwrap().id, child);
        assert_eq!(remove_groups(&mut store, &[child, "nope".into()]), 1);
    }
}
