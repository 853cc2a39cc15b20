/// One originally-selected item as listed at the top of the artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestEntry {
    Group {
        name: String,
    },
    File {
        path: String,
        /// Also covered by a selected group's expansion
        deduplicated: bool,
    },
    Bookmark {
        path: String,
        /// Zero-based
        line: usize,
        label: String,
    },
}

/// The list of selected items, displayed up to `limit` lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
    limit: usize,
}

impl Manifest {
    pub fn new(entries: Vec<ManifestEntry>, limit: usize) -> Self {
        Self { entries, limit }
    }

    /// Untruncated item count
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Entries shown before the "...and N more" trailer
    pub fn visible(&self) -> &[ManifestEntry] {
        &self.entries[..self.entries.len().min(self.limit)]
    }

    /// Entries cut from the display
    pub fn hidden(&self) -> usize {
        self.entries.len().saturating_sub(self.limit)
    }
}
