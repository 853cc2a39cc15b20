use super::types::SelectionItem;
use std::collections::HashSet;

/// Which source a resolved selection came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    Explicit,
    Invoked,
    Fallback,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSelection {
    pub items: Vec<SelectionItem>,
    pub source: SelectionSource,
}

impl ResolvedSelection {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Resolves the working set for every bulk command.
///
/// Priority: a non-empty explicit multi-selection, then the single invoked
/// item, then whatever the fallback provider currently has selected. The
/// fallback is only queried when both earlier sources are empty. The result
/// is deduplicated by identity and keeps the chosen source's order.
pub fn resolve_selection<F>(
    explicit: &[SelectionItem],
    invoked: Option<&SelectionItem>,
    fallback: F,
) -> ResolvedSelection
where
    F: FnOnce() -> Vec<SelectionItem>,
{
    let (items, source) = if !explicit.is_empty() {
        (explicit.to_vec(), SelectionSource::Explicit)
    } else if let Some(item) = invoked {
        (vec![item.clone()], SelectionSource::Invoked)
    } else {
        let current = fallback();
        if current.is_empty() {
            (current, SelectionSource::Empty)
        } else {
            (current, SelectionSource::Fallback)
        }
    };

    ResolvedSelection {
        items: dedup(items),
        source,
    }
}

fn dedup(items: Vec<SelectionItem>) -> Vec<SelectionItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.key()))
        .collect()
}

/// Splits a selection by kind, keeping order within each kind
pub fn partition(items: &[SelectionItem]) -> (Vec<&SelectionItem>, Vec<&SelectionItem>, Vec<&SelectionItem>) {
    let mut groups = Vec::new();
    let mut files = Vec::new();
    let mut bookmarks = Vec::new();
    for item in items {
        match item {
            SelectionItem::Group { .. } => groups.push(item),
            SelectionItem::File { .. } => files.push(item),
            SelectionItem::Bookmark { .. } => bookmarks.push(item),
        }
    }
    (groups, files, bookmarks)
}
