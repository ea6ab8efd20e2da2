//! Editor configuration
//!
//! Every interval, margin and policy the sync core uses. The browser host
//! passes a (possibly partial) camelCase object; missing fields fall back to
//! the defaults below.

use serde::{Deserialize, Serialize};

use crate::layout::FontMetrics;
use crate::utils::scheduler::Millis;

/// What to do with a remote content snapshot while local edits are unsaved
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum RemoteContentPolicy {
    /// Always replace the local buffer
    #[default]
    Replace,
    /// Keep the local buffer until it has been saved
    DeferWhileDirty,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// This client's user id; its own record in the collaboration feed is ignored
    pub local_user_id: Option<String>,

    /// Quiet period after local input before changes count as programmatic
    pub typing_quiet_ms: Millis,

    /// Trailing debounce before an autosave fires
    pub autosave_debounce_ms: Millis,

    /// Debounce after the remote cursor key changes
    pub cursor_recompute_debounce_ms: Millis,

    /// Throttle interval for scroll-driven re-culling
    pub scroll_throttle_ms: Millis,

    /// Debounce for window resize settling
    pub resize_debounce_ms: Millis,

    /// Distance outside the frame within which cursors are still drawn
    pub visibility_margin_px: f32,

    pub font: FontMetrics,

    pub remote_content_policy: RemoteContentPolicy,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            local_user_id: None,
            typing_quiet_ms: 500,
            autosave_debounce_ms: 2000,
            cursor_recompute_debounce_ms: 100,
            scroll_throttle_ms: 16,
            resize_debounce_ms: 50,
            visibility_margin_px: 50.0,
            font: FontMetrics::default(),
            remote_content_policy: RemoteContentPolicy::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a JSON config, falling back to defaults per missing field
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_local_user(mut self, user_id: impl Into<String>) -> Self {
        self.local_user_id = Some(user_id.into());
        self
    }
}
