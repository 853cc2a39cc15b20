//! Ordered in-memory collection of groups
//!
//! Groups are flat records; `parent_group_id` is a lookup key, not an
//! ownership pointer. Positions are only meaningful for the duration of a
//! single operation.

use super::types::{Group, GroupId, new_id};
use std::collections::HashSet;

/// Direction for a positional swap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupStore {
    groups: Vec<Group>,
}

impl GroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from persisted records, normalizing what an external
    /// edit may have broken: missing or repeated ids get fresh ones,
    /// duplicate file references collapse, empty bookmark buckets go away.
    /// Existing ids are kept verbatim so parent links stay valid.
    pub fn from_groups(groups: Vec<Group>) -> Self {
        let mut seen_ids = HashSet::new();
        let mut normalized = Vec::with_capacity(groups.len());

        for mut group in groups {
            if group.id.is_empty() || !seen_ids.insert(group.id.clone()) {
                let fresh = new_id();
                log::warn!(
                    "group '{}' had a missing or repeated id, assigned {}",
                    group.name,
                    fresh
                );
                group.id = fresh;
                seen_ids.insert(group.id.clone());
            }

            let mut seen_files = HashSet::new();
            group.files.retain(|f| seen_files.insert(f.clone()));
            group.bookmarks.retain(|_, marks| !marks.is_empty());

            normalized.push(group);
        }

        Self { groups: normalized }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<Group> {
        self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Group> {
        self.groups.iter()
    }

    /// Gives `group` a fresh id when its own is empty or already in use.
    fn claim_id(&self, group: &mut Group) {
        if group.id.is_empty() || self.find(&group.id).is_some() {
            let fresh = new_id();
            log::warn!(
                "group '{}' reused id '{}', assigned {}",
                group.name,
                group.id,
                fresh
            );
            group.id = fresh;
        }
    }

    /// Appends a group and returns its id, which is fresh if the given one
    /// was empty or taken.
    pub fn insert(&mut self, mut group: Group) -> GroupId {
        self.claim_id(&mut group);
        let id = group.id.clone();
        self.groups.push(group);
        id
    }

    /// Inserts at `index`, clamped to the end of the store.
    pub fn insert_at(&mut self, index: usize, mut group: Group) -> GroupId {
        self.claim_id(&mut group);
        let id = group.id.clone();
        let index = index.min(self.groups.len());
        self.groups.insert(index, group);
        id
    }

    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&Group) -> bool,
    {
        self.groups.retain(f);
    }

    pub fn find(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&Group> {
        self.groups.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Group> {
        self.groups.get_mut(index)
    }

    pub fn remove_by_id(&mut self, id: &str) -> Option<Group> {
        let index = self.index_of(id)?;
        Some(self.groups.remove(index))
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Group> {
        if index < self.groups.len() {
            Some(self.groups.remove(index))
        } else {
            None
        }
    }

    /// Swaps the group at `index` with its raw positional neighbour.
    /// Returns false when there is nothing to swap with.
    pub fn move_at(&mut self, index: usize, direction: Direction) -> bool {
        let target = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => index.checked_add(1),
        };
        match target {
            Some(t) if index < self.groups.len() && t < self.groups.len() => {
                self.groups.swap(index, t);
                true
            }
            _ => false,
        }
    }

    /// Swaps two positions. Both must exist.
    pub fn swap(&mut self, a: usize, b: usize) -> bool {
        if a < self.groups.len() && b < self.groups.len() {
            self.groups.swap(a, b);
            true
        } else {
            false
        }
    }

    /// Re-parents a group. Refuses to link a group to itself.
    pub fn reparent(&mut self, id: &str, parent: Option<GroupId>) -> bool {
        if parent.as_deref() == Some(id) {
            return false;
        }
        match self.find_mut(id) {
            Some(group) => {
                group.parent_group_id = parent;
                true
            }
            None => false,
        }
    }

    /// Parent of a group, treating a dangling parent id as no parent.
    pub fn parent_of(&self, group: &Group) -> Option<&Group> {
        group
            .parent_group_id
            .as_deref()
            .and_then(|pid| self.find(pid))
    }

    /// Direct children of `id` in store order
    pub fn children_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Group> + 'a {
        self.groups
            .iter()
            .filter(move |g| g.parent_group_id.as_deref() == Some(id))
    }

    /// Groups that resolve as roots: no parent, or a parent that no longer exists
    pub fn roots(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter().filter(|g| self.parent_of(g).is_none())
    }

    pub fn name_taken(&self, name: &str) -> bool {
        self.groups.iter().any(|g| g.name == name)
    }
}
