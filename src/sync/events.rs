//! Events consumed from the host and the effects handed back to it

use serde::{Deserialize, Serialize};

use crate::models::{DueSave, RemoteCursor};
use crate::text::TextRange;

/// The input surface's value changed through typing
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TextChange {
    /// New display content
    pub new_content: String,
    /// Caret after the change (display space)
    pub cursor_offset: usize,
}

/// Clipboard text pasted over a selection
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PasteEvent {
    pub clipboard_text: String,
    pub selection_range: TextRange,
}

/// One delivery from the collaboration feed
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncSnapshot {
    /// Synced full content; every cursor offset refers to it
    pub content: String,
    #[serde(default)]
    pub cursors: Vec<RemoteCursor>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NoticeKind {
    SaveFailed,
    RemoteDeferred,
}

/// A non-blocking message for the user
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Work the host must do after `tick`
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditorEffects {
    /// Saves to persist now; report each back with `complete_save`
    pub saves: Vec<DueSave>,
    /// Schedule an animation frame and call `on_animation_frame`
    pub frame_requested: bool,
    /// Re-read `visible_cursors` and redraw the overlay
    pub render: bool,
}

impl EditorEffects {
    pub fn is_empty(&self) -> bool {
        self.saves.is_empty() && !self.frame_requested && !self.render
    }
}

/// What a remote snapshot did to the local buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoteApply {
    /// The buffer was replaced; the caret outcome is attached
    Applied(crate::sync::cursor_preserver::Restoration),
    /// Same full content as the local buffer
    Identical,
    /// Local edits are unsaved; the buffer was left alone
    Deferred,
}
