//! Cursor preservation across programmatic content swaps
//!
//! When a remote snapshot replaces the text under the user's caret, the
//! input surface would otherwise drop the caret at the end (or the start) of
//! the new value. The preserver decides whether a change was local typing,
//! which needs no help, or programmatic, and in the latter case computes
//! where the caret should go. The result is returned synchronously so the
//! host can apply it in the same frame as the text swap.
//!
//! The heuristic assumes one contiguous edit between snapshots. When a local
//! and a remote edit land in the same cycle it can misplace the caret.

use crate::error::SyncError;
use crate::models::{CursorMode, CursorState};
use crate::text::offsets::{char_len, common_prefix_len};
use crate::utils::scheduler::{Millis, ScheduledTask};

/// Outcome of a content change, from the caret's point of view
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Restoration {
    /// Local typing in progress; the input surface keeps its own caret
    Skipped,
    /// Content identical; nothing to do
    Unchanged,
    /// Programmatic change; the caret must be set to this display offset
    Restored(usize),
}

impl Restoration {
    pub fn offset(&self) -> Option<usize> {
        match self {
            Restoration::Restored(offset) => Some(*offset),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct CursorPreserver {
    state: CursorState,
    quiet_period: Millis,
    quiet_timer: ScheduledTask<()>,
}

impl CursorPreserver {
    pub fn new(quiet_period: Millis) -> Self {
        Self {
            state: CursorState::default(),
            quiet_period,
            quiet_timer: ScheduledTask::new(),
        }
    }

    pub fn state(&self) -> &CursorState {
        &self.state
    }

    pub fn saved_offset(&self) -> usize {
        self.state.saved_offset
    }

    pub fn mode(&self) -> CursorMode {
        self.state.mode
    }

    /// A keystroke or paste happened; caret now at `cursor_offset`
    pub fn on_local_input(&mut self, now: Millis, cursor_offset: usize) {
        self.state.mode = CursorMode::UserTyping;
        self.state.last_edit_time = Some(now);
        self.state.saved_offset = cursor_offset;
        self.quiet_timer.schedule(now, self.quiet_period, ());
    }

    /// The caret moved without an edit
    pub fn on_selection_change(&mut self, cursor_offset: usize) {
        self.state.saved_offset = cursor_offset;
    }

    /// Expire the quiet period; returns true when the mode fell back to idle
    pub fn tick(&mut self, now: Millis) -> bool {
        if self.quiet_timer.poll(now).is_some() {
            log::trace!("typing quiet period elapsed at {}", now);
            self.state.mode = CursorMode::Idle;
            return true;
        }
        false
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.quiet_timer.due_at()
    }

    /// Whether a change at `now` should be attributed to local typing
    pub fn is_local(&self, now: Millis) -> bool {
        if self.state.mode == CursorMode::UserTyping {
            return true;
        }
        self.state
            .last_edit_time
            .is_some_and(|t| now < t.saturating_add(self.quiet_period))
    }

    /// React to the display content changing from `previous` to `new`
    pub fn on_content_change(&mut self, previous: &str, new: &str, now: Millis) -> Restoration {
        self.tick(now);

        if self.is_local(now) {
            log::debug!("{}", SyncError::RestorationSkipped);
            return Restoration::Skipped;
        }

        if previous == new {
            return Restoration::Unchanged;
        }

        let restored = restore_offset(self.state.saved_offset, previous, new);
        log::debug!(
            "restoring caret {} -> {} after programmatic change",
            self.state.saved_offset,
            restored
        );
        self.state.saved_offset = restored;
        Restoration::Restored(restored)
    }

    /// Cancel the quiet-period timer
    pub fn dispose(&mut self) {
        self.quiet_timer.cancel();
        self.state.mode = CursorMode::Idle;
    }
}

/// Where a caret at `saved` belongs after `previous` became `new`
///
/// With `L` the common prefix length: a caret at or before `L` did not move;
/// a caret past `L` shifts by the net length change. Always clamped to the
/// new text.
pub fn restore_offset(saved: usize, previous: &str, new: &str) -> usize {
    let previous_len = char_len(previous);
    let new_len = char_len(new);
    let prefix = common_prefix_len(previous, new);

    if saved <= prefix {
        return saved.min(new_len);
    }

    let shifted = saved as i64 + new_len as i64 - previous_len as i64;
    shifted.clamp(0, new_len as i64) as usize
}
