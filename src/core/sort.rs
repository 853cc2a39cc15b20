use super::types::{FileEntry, SortKey, SortOrder};
use std::cmp::Ordering;

/// Orders entries by `key`. `SortOrder::Desc` reverses the comparator, so
/// entries that compare equal keep their original relative order in both
/// directions. `SortKey::None` leaves the input untouched.
pub fn sort_entries(mut entries: Vec<FileEntry>, key: SortKey, order: SortOrder) -> Vec<FileEntry> {
    if key == SortKey::None {
        return entries;
    }
    entries.sort_by(|a, b| {
        let ord = compare(a, b, key);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
    entries
}

fn compare(a: &FileEntry, b: &FileEntry, key: SortKey) -> Ordering {
    match key {
        SortKey::None => Ordering::Equal,
        SortKey::Name => compare_names(a, b),
        SortKey::Path => a.path.cmp(&b.path),
        SortKey::Extension => a
            .extension()
            .cmp(&b.extension())
            .then_with(|| compare_names(a, b)),
        SortKey::Modified => a
            .modified
            .cmp(&b.modified)
            .then_with(|| compare_names(a, b)),
    }
}

fn compare_names(a: &FileEntry, b: &FileEntry) -> Ordering {
    a.name().to_lowercase().cmp(&b.name().to_lowercase())
}
