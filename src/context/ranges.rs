/// An inclusive, zero-based line window with the bookmark labels it serves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
    pub labels: Vec<String>,
}

impl LineRange {
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            labels: vec![label.into()],
        }
    }

    /// Window of `radius` lines around `line`, clamped to `[0, last_line]`.
    pub fn around(line: usize, radius: usize, last_line: usize, label: impl Into<String>) -> Self {
        let end = line.saturating_add(radius).min(last_line);
        let start = line.saturating_sub(radius).min(end);
        Self::new(start, end, label)
    }
}

/// Collapses overlapping or line-adjacent windows into the minimum set of
/// disjoint blocks. Windows are ordered by start (stable for equal starts);
/// a window joins the current block when it starts at most one line after
/// the block's end, and the block accumulates its labels.
pub fn merge_ranges(mut ranges: Vec<LineRange>) -> Vec<LineRange> {
    ranges.sort_by_key(|r| r.start);

    let mut merged: Vec<LineRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(current) if range.start <= current.end.saturating_add(1) => {
                current.end = current.end.max(range.end);
                current.labels.extend(range.labels);
            }
            _ => merged.push(range),
        }
    }
    merged
}
