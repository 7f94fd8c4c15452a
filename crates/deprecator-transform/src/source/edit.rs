//! Text edits accumulated per source unit and applied in one pass

use std::ops::Range;

/// One byte-range replacement; insertions have an empty range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: Range<usize>,
    pub text: String,
}

/// Pending edits for one source unit
#[derive(Debug, Clone, Default)]
pub struct EditSet {
    edits: Vec<Edit>,
}

impl EditSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `text` before byte `at`
    pub fn insert(&mut self, at: usize, text: impl Into<String>) {
        self.replace(at..at, text);
    }

    /// Replace `range` with `text`
    pub fn replace(&mut self, range: Range<usize>, text: impl Into<String>) {
        self.edits.push(Edit {
            range,
            text: text.into(),
        });
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Apply every edit to `source`
    ///
    /// Edits are ordered by position; insertions at the same position keep
    /// the order they were added in. An edit overlapping an earlier one, or
    /// one outside `source`, is dropped.
    #[must_use]
    pub fn apply(mut self, source: &str) -> String {
        // stable sort keeps insertion order for equal starts
        self.edits.sort_by_key(|edit| edit.range.start);

        let extra: usize = self.edits.iter().map(|e| e.text.len()).sum();
        let mut out = String::with_capacity(source.len() + extra);
        let mut cursor = 0;

        for edit in self.edits {
            let Range { start, end } = edit.range;
            let in_bounds = start <= end
                && end <= source.len()
                && source.is_char_boundary(start)
                && source.is_char_boundary(end);
            if start < cursor || !in_bounds {
                tracing::warn!("Dropping conflicting edit at bytes {}..{}", start, end);
                continue;
            }
            out.push_str(&source[cursor..start]);
            out.push_str(&edit.text);
            cursor = end;
        }
        out.push_str(&source[cursor..]);
        out
    }
}
