//! The editable document
//!
//! Holds the authoritative full content together with its projection. The
//! display content is always derived, never stored independently, so the two
//! can't drift apart.

use crate::text::{Projection, StructuralMarker};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    full_content: String,
    projection: Projection,
}

impl Document {
    pub fn new(full_content: impl Into<String>) -> Self {
        let full_content = full_content.into();
        let projection = Projection::build(&full_content);
        Self {
            full_content,
            projection,
        }
    }

    pub fn full_content(&self) -> &str {
        &self.full_content
    }

    pub fn display_content(&self) -> &str {
        self.projection.display()
    }

    pub fn display_len(&self) -> usize {
        self.projection.display_len()
    }

    pub fn full_len(&self) -> usize {
        self.projection.full_len()
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn markers(&self) -> &[StructuralMarker] {
        self.projection.markers()
    }

    /// Replace the full content wholesale (remote sync, reload)
    ///
    /// Returns the previous display content.
    pub fn replace_full(&mut self, full_content: impl Into<String>) -> String {
        let previous = self.display_content().to_string();
        self.full_content = full_content.into();
        self.projection = Projection::build(&self.full_content);
        previous
    }

    /// Apply an edited display text, keeping markers outside the edit
    ///
    /// The display text becomes exactly `new_display`; markers are carried
    /// through the edit and only re-parsed on `replace_full`. Returns false
    /// when the display text was already identical.
    pub fn apply_display_edit(&mut self, new_display: &str) -> bool {
        if new_display == self.display_content() {
            return false;
        }
        let (full_content, projection) = self
            .projection
            .splice_display_edit(&self.full_content, new_display);
        self.full_content = full_content;
        self.projection = projection;
        true
    }

    /// Display offset for a full-content offset
    pub fn to_display_offset(&self, full_offset: usize) -> usize {
        self.projection.full_to_display(full_offset)
    }

    /// Full-content offset for a display offset
    pub fn to_full_offset(&self, display_offset: usize) -> usize {
        self.projection.display_to_full(display_offset)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(String::new())
    }
}
