//! Cursor and selection ranges over display text
//!
//! Positions are char offsets into a single flat string.

use serde::{Deserialize, Serialize};

/// A range of text from start (inclusive) to end (exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    /// Create a range, ordering the endpoints
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Create an empty range at a caret position
    pub fn caret(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }

    /// Check if this range is empty (start == end)
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if a position is contained within this range
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Clamp both endpoints to `[0, max]`
    pub fn clamped(&self, max: usize) -> Self {
        Self {
            start: self.start.min(max),
            end: self.end.min(max),
        }
    }
}

/// Selection state (anchor + head)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Where the selection started
    pub anchor: usize,
    /// Current caret position
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (cursor only, no selection)
    pub fn collapsed(pos: usize) -> Self {
        Self { anchor: pos, head: pos }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// Get the range covered by this selection (ordered start to end)
    pub fn range(&self) -> TextRange {
        TextRange::new(self.anchor, self.head)
    }
}
