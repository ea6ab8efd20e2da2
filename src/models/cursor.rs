//! Local cursor state and remote collaborator cursors

use serde::{Deserialize, Serialize};

use crate::text::Selection;
use crate::utils::scheduler::Millis;

/// Whether the local user is mid-burst
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde_repr::Serialize_repr, serde_repr::Deserialize_repr,
)]
#[repr(u8)]
pub enum CursorMode {
    #[default]
    Idle = 0,
    UserTyping = 1,
}

/// Local caret bookkeeping (display space)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CursorState {
    /// Last known caret offset in display content
    pub saved_offset: usize,
    pub mode: CursorMode,
    /// Host time of the most recent local input event
    pub last_edit_time: Option<Millis>,
}

/// A collaborator's cursor as reported by the collaboration feed
///
/// Offsets refer to the synced content snapshot, not to the local buffer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCursor {
    pub user_id: String,
    pub offset: usize,
    #[serde(default)]
    pub selection_start: Option<usize>,
    #[serde(default)]
    pub selection_end: Option<usize>,
    /// CSS color; assigned from the palette when the feed omits it
    #[serde(default)]
    pub color: Option<String>,
}

impl RemoteCursor {
    pub fn new(user_id: impl Into<String>, offset: usize) -> Self {
        Self {
            user_id: user_id.into(),
            offset,
            selection_start: None,
            selection_end: None,
            color: None,
        }
    }

    pub fn with_selection(mut self, start: usize, end: usize) -> Self {
        self.selection_start = Some(start);
        self.selection_end = Some(end);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Both selection endpoints, ordered, when present and non-empty
    pub fn selection(&self) -> Option<(usize, usize)> {
        let selection = Selection::new(self.selection_start?, self.selection_end?);
        if selection.is_collapsed() {
            return None;
        }
        let range = selection.range();
        Some((range.start, range.end))
    }
}

const PALETTE: [&str; 8] = [
    "#e6194b", "#3cb44b", "#4363d8", "#f58231", "#911eb4", "#42d4f4", "#f032e6", "#9a6324",
];

/// Stable palette color for a user id
pub fn palette_color(user_id: &str) -> &'static str {
    // FNV-1a so the color never changes between sessions
    let hash = user_id
        .bytes()
        .fold(0x811c_9dc5_u32, |h, b| (h ^ b as u32).wrapping_mul(0x0100_0193));
    PALETTE[hash as usize % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_is_ordered_and_skips_empty() {
        let cursor = RemoteCursor::new("ana", 4).with_selection(9, 2);
        assert_eq!(cursor.selection(), Some((2, 9)));

        let collapsed = RemoteCursor::new("ana", 4).with_selection(3, 3);
        assert_eq!(collapsed.selection(), None);
    }

    #[test]
    fn test_palette_color_is_stable() {
        assert_eq!(palette_color("user-1"), palette_color("user-1"));
        assert!(palette_color("user-2").starts_with('#'));
    }

    #[test]
    fn test_remote_cursor_deserializes_feed_record() {
        let json = r#"{"userId":"bo","offset":12,"selectionStart":10}"#;
        let cursor: RemoteCursor = serde_json::from_str(json).unwrap();
        assert_eq!(cursor.user_id, "bo");
        assert_eq!(cursor.selection_start, Some(10));
        assert_eq!(cursor.color, None);
    }
}
