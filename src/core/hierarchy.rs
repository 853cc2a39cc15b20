//! Ancestor paths and recursive file collection over a `GroupStore`
//!
//! Stored parent links are never trusted to be acyclic. Downward walks track
//! visited groups; upward walks track visited groups and stop at a fixed
//! depth.

use super::store::GroupStore;
use super::types::{FileRef, Group};
use std::collections::HashSet;

pub const DEFAULT_MAX_DEPTH: usize = 50;
pub const CYCLE_MARKER: &str = "[CYCLE DETECTED]";
pub const MAX_DEPTH_MARKER: &str = "[MAX DEPTH]";

pub struct Hierarchy<'a> {
    store: &'a GroupStore,
    max_depth: usize,
}

impl<'a> Hierarchy<'a> {
    pub fn new(store: &'a GroupStore) -> Self {
        Self {
            store,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Groups reachable downward from `id` (itself included), depth-first,
    /// children in store order. Each group appears at most once.
    pub fn descendants(&self, id: &str) -> Vec<&'a Group> {
        let Some(root) = self.store.find(id) else {
            return Vec::new();
        };

        let mut visited: HashSet<&str> = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![root];

        while let Some(group) = stack.pop() {
            if !visited.insert(group.id.as_str()) {
                continue;
            }
            order.push(group);

            let children: Vec<&Group> = self.store.children_of(&group.id).collect();
            for child in children.into_iter().rev() {
                if !visited.contains(child.id.as_str()) {
                    stack.push(child);
                }
            }
        }

        order
    }

    /// Files of the group and all its descendants: the group's own files
    /// first, then each child subtree in store order. A file reachable
    /// through several descendants is listed once, at its first position.
    pub fn collect_files(&self, id: &str) -> Vec<FileRef> {
        let mut seen = HashSet::new();
        let mut files = Vec::new();
        for group in self.descendants(id) {
            for file in &group.files {
                if seen.insert(file.as_str()) {
                    files.push(file.clone());
                }
            }
        }
        files
    }

    /// `"Root / Child / Leaf"` for the group, walking parent links upward.
    ///
    /// A revisited id appends `[CYCLE DETECTED]`; exceeding the depth bound
    /// appends `[MAX DEPTH]`. A dangling parent ends the walk silently.
    /// Returns `None` when the group does not exist.
    pub fn group_path(&self, id: &str) -> Option<String> {
        let group = self.store.find(id)?;

        let mut visited: HashSet<&str> = HashSet::new();
        let mut names: Vec<&str> = vec![group.name.as_str()];
        let mut marker = None;
        let mut current = group;
        visited.insert(current.id.as_str());

        while let Some(parent_id) = current.parent_group_id.as_deref() {
            if visited.contains(parent_id) {
                log::warn!("circular group reference detected at {}", parent_id);
                marker = Some(CYCLE_MARKER);
                break;
            }
            if visited.len() >= self.max_depth {
                log::warn!(
                    "group nesting exceeds maximum depth of {}",
                    self.max_depth
                );
                marker = Some(MAX_DEPTH_MARKER);
                break;
            }
            let Some(parent) = self.store.find(parent_id) else {
                break;
            };
            names.push(parent.name.as_str());
            visited.insert(parent.id.as_str());
            current = parent;
        }

        names.reverse();
        let mut path = names.join(" / ");
        if let Some(m) = marker {
            path.push(' ');
            path.push_str(m);
        }
        Some(path)
    }

    /// Number of ancestors above the group, bounded like `group_path`.
    pub fn depth(&self, id: &str) -> usize {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut depth = 0;
        let mut current = self.store.find(id);
        while let Some(group) = current {
            if !visited.insert(group.id.as_str()) || depth >= self.max_depth {
                break;
            }
            current = self.store.parent_of(group);
            if current.is_some() {
                depth += 1;
            }
        }
        depth
    }

    /// True when `candidate` sits somewhere below `ancestor`.
    pub fn is_descendant(&self, candidate: &str, ancestor: &str) -> bool {
        candidate != ancestor
            && self
                .descendants(ancestor)
                .iter()
                .any(|g| g.id == candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: &str, parent: Option<&str>, files: &[&str]) -> Group {
        Group {
            id: id.into(),
            name: id.to_uppercase(),
            parent_group_id: parent.map(String::from),
            files: files.iter().map(|f| f.to_string()).collect(),
            ..Default::default()
        }
    }

    fn store(groups: Vec<Group>) -> GroupStore {
        GroupStore::from_groups(groups)
    }

    #[test]
    fn test_collect_files_depth_first() {
        let s = store(vec![
            group("root", None, &["r1", "r2"]),
            group("a", Some("root"), &["a1"]),
            group("b", Some("root"), &["b1"]),
            group("a_child", Some("a"), &["ac1"]),
            group("other", None, &["o1"]),
        ]);
        let files = Hierarchy::new(&s).collect_files("root");
        assert_eq!(files, vec!["r1", "r2", "a1", "ac1", "b1"]);
    }

    #[test]
    fn test_collect_files_survives_parent_cycle() {
        let s = store(vec![
            group("a", Some("b"), &["a1"]),
            group("b", Some("a"), &["b1"]),
        ]);
        let h = Hierarchy::new(&s);
        assert_eq!(h.collect_files("a"), vec!["a1", "b1"]);
        assert_eq!(h.descendants("b").len(), 2);
    }

    #[test]
    fn test_collect_files_missing_group() {
        let s = store(vec![group("a", None, &["a1"])]);
        assert!(Hierarchy::new(&s).collect_files("nope").is_empty());
    }

    #[test]
    fn test_group_path_simple() {
        let s = store(vec![
            group("root", None, &[]),
            group("child", Some("root"), &[]),
            group("leaf", Some("child"), &[]),
        ]);
        let h = Hierarchy::new(&s);
        assert_eq!(h.group_path("leaf").unwrap(), "ROOT / CHILD / LEAF");
        assert_eq!(h.group_path("root").unwrap(), "ROOT");
        assert!(h.group_path("missing").is_none());
        assert_eq!(h.depth("leaf"), 2);
    }

    #[test]
    fn test_group_path_cycle_marker() {
        let s = store(vec![
            group("a", Some("c"), &[]),
            group("b", Some("a"), &[]),
            group("c", Some("b"), &[]),
        ]);
        let path = Hierarchy::new(&s).group_path("c").unwrap();
        assert_eq!(path, "A / B / C [CYCLE DETECTED]");
    }

    #[test]
    fn test_group_path_self_parent() {
        let s = store(vec![group("a", Some("a"), &[])]);
        let path = Hierarchy::new(&s).group_path("a").unwrap();
        assert!(path.ends_with(CYCLE_MARKER));
    }

    #[test]
    fn test_group_path_dangling_parent() {
        let s = store(vec![group("a", Some("deleted"), &[])]);
        assert_eq!(Hierarchy::new(&s).group_path("a").unwrap(), "A");
    }

    #[test]
    fn test_group_path_max_depth() {
        let mut groups = vec![group("g0", None, &[])];
        for i in 1..80 {
            let parent = format!("g{}", i - 1);
            groups.push(group(&format!("g{}", i), Some(&parent), &[]));
        }
        let s = store(groups);
        let path = Hierarchy::new(&s).group_path("g79").unwrap();
        assert!(path.ends_with(MAX_DEPTH_MARKER));
        assert_eq!(path.matches(" / ").count(), DEFAULT_MAX_DEPTH - 1);
        assert!(!path.contains(CYCLE_MARKER));
    }

    #[test]
    fn test_is_descendant() {
        let s = store(vec![
            group("root", None, &[]),
            group("child", Some("root"), &[]),
        ]);
        let h = Hierarchy::new(&s);
        assert!(h.is_descendant("child", "root"));
        assert!(!h.is_descendant("root", "child"));
        assert!(!h.is_descendant("root", "root"));
    }
}
