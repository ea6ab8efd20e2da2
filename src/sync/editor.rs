//! The owning editor instance
//!
//! `SyncEditor` is the only writer of the `Document`. Local typing, remote
//! snapshots and save completions all come through it; it routes each one
//! to the component that cares and collects the host work they produce.

use crate::config::{EditorConfig, RemoteContentPolicy};
use crate::error::PersistError;
use crate::layout::{MonospaceLayout, TextLayoutOracle};
use crate::models::{AuxiliarySnapshot, Document, DueSave, OverlayFrame, SaveRequest, SaveTicket, ScrollOffset};
use crate::text::offsets::{char_len, char_to_byte};
use crate::utils::scheduler::Millis;

use super::autosave::{AutoSaveScheduler, SaveOutcome};
use super::cursor_preserver::CursorPreserver;
use super::events::{EditorEffects, Notice, NoticeKind, PasteEvent, RemoteApply, SyncSnapshot, TextChange};
use super::overlay::{GeometrySource, OverlayPositioner};
use super::remote_cursors::{ProjectorTiming, RemoteCursorProjector, VisibleCursor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Active,
    Disposed,
}

pub struct SyncEditor<L: TextLayoutOracle = MonospaceLayout> {
    config: EditorConfig,
    document: Document,
    preserver: CursorPreserver,
    projector: RemoteCursorProjector<L>,
    overlay: OverlayPositioner,
    autosave: AutoSaveScheduler,
    auxiliary: AuxiliarySnapshot,
    notices: Vec<Notice>,
    geometry: Box<dyn GeometrySource>,
    /// Wall-clock epoch ms at host time zero
    time_origin: u64,
    /// A remote snapshot is being held back because of unsaved local edits
    remote_deferred: bool,
    lifecycle: Lifecycle,
}

impl SyncEditor<MonospaceLayout> {
    /// Editor laid out on the fixed-pitch grid from `config.font`
    pub fn with_monospace(config: EditorConfig, geometry: Box<dyn GeometrySource>) -> Self {
        let layout = MonospaceLayout::new(config.font);
        Self::new(config, layout, geometry)
    }
}

impl<L: TextLayoutOracle> SyncEditor<L> {
    pub fn new(config: EditorConfig, layout: L, geometry: Box<dyn GeometrySource>) -> Self {
        let timing = ProjectorTiming {
            recompute_debounce: config.cursor_recompute_debounce_ms,
            scroll_throttle: config.scroll_throttle_ms,
            margin: config.visibility_margin_px,
        };
        let projector = RemoteCursorProjector::new(layout, timing).with_local_user(config.local_user_id.clone());

        Self {
            preserver: CursorPreserver::new(config.typing_quiet_ms),
            overlay: OverlayPositioner::new(config.resize_debounce_ms),
            autosave: AutoSaveScheduler::new(config.autosave_debounce_ms),
            projector,
            document: Document::default(),
            auxiliary: AuxiliarySnapshot::new(),
            notices: Vec::new(),
            geometry,
            time_origin: 0,
            remote_deferred: false,
            lifecycle: Lifecycle::Active,
            config,
        }
    }

    /// Start with already persisted content; nothing is dirty
    pub fn with_content(mut self, full_content: impl Into<String>) -> Self {
        self.document = Document::new(full_content);
        self
    }

    pub fn with_time_origin(mut self, epoch_ms: u64) -> Self {
        self.time_origin = epoch_ms;
        self
    }

    fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    pub fn is_disposed(&self) -> bool {
        !self.is_active()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn display_content(&self) -> &str {
        self.document.display_content()
    }

    pub fn full_content(&self) -> &str {
        self.document.full_content()
    }

    /// Last known caret, display space
    pub fn cursor_offset(&self) -> usize {
        self.preserver.saved_offset()
    }

    pub fn is_dirty(&self) -> bool {
        self.autosave.is_dirty()
    }

    pub fn overlay_frame(&self) -> OverlayFrame {
        self.overlay.frame()
    }

    pub fn projector(&self) -> &RemoteCursorProjector<L> {
        &self.projector
    }

    pub fn visible_cursors(&self) -> Vec<VisibleCursor> {
        if !self.is_active() {
            return Vec::new();
        }
        self.projector.visible_cursors()
    }

    /// Drain pending user notices
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn timestamp(&self, now: Millis) -> u64 {
        self.time_origin.saturating_add(now)
    }

    /// Measure the editing surface for the first time
    ///
    /// Returns true when the host should schedule an animation frame.
    pub fn mount(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        match self.overlay.mount(self.geometry.as_ref()) {
            Some(frame) => self.projector.on_frame_changed(frame),
            None => false,
        }
    }

    /// The user typed; `change.new_content` is the whole display text
    ///
    /// Returns false when the text did not actually change.
    pub fn on_text_change(&mut self, change: TextChange, now: Millis) -> bool {
        if !self.is_active() {
            return false;
        }

        let caret = change.cursor_offset.min(char_len(&change.new_content));
        self.preserver.on_local_input(now, caret);

        if !self.document.apply_display_edit(&change.new_content) {
            return false;
        }
        self.schedule_save(now);
        true
    }

    /// Insert clipboard text over the selection
    ///
    /// Line endings are normalized to `\n`. Returns the caret to set after
    /// the paste, or `None` after dispose.
    pub fn on_paste(&mut self, paste: PasteEvent, now: Millis) -> Option<usize> {
        if !self.is_active() {
            return None;
        }

        let text = normalize_line_endings(&paste.clipboard_text);
        let display = self.document.display_content();
        let range = paste.selection_range.clamped(char_len(display));

        let start = char_to_byte(display, range.start);
        let end = char_to_byte(display, range.end);
        let mut new_content = String::with_capacity(display.len() - (end - start) + text.len());
        new_content.push_str(&display[..start]);
        new_content.push_str(&text);
        new_content.push_str(&display[end..]);

        let caret = range.start + char_len(&text);
        self.on_text_change(
            TextChange {
                new_content,
                cursor_offset: caret,
            },
            now,
        );
        Some(caret)
    }

    /// The caret moved without an edit
    pub fn on_selection_change(&mut self, cursor_offset: usize) {
        if !self.is_active() {
            return;
        }
        let offset = cursor_offset.min(self.document.display_len());
        self.preserver.on_selection_change(offset);
    }

    /// Returns true when the visible cursors should be redrawn right away
    pub fn on_scroll(&mut self, scroll: ScrollOffset, now: Millis) -> bool {
        if !self.is_active() {
            return false;
        }
        self.projector.on_scroll(scroll, now)
    }

    pub fn on_resize(&mut self, now: Millis) {
        if !self.is_active() {
            return;
        }
        self.overlay.on_resize(now);
    }

    /// Replace the snapshot of one auxiliary entity kind and schedule a save
    pub fn set_auxiliary(&mut self, kind: impl Into<String>, value: serde_json::Value, now: Millis) {
        if !self.is_active() {
            return;
        }
        self.auxiliary.insert(kind.into(), value);
        self.schedule_save(now);
    }

    pub fn auxiliary(&self) -> &AuxiliarySnapshot {
        &self.auxiliary
    }

    fn schedule_save(&mut self, now: Millis) {
        let content = self.document.full_content().to_string();
        let timestamp = self.timestamp(now);
        self.autosave
            .schedule_save(content, true, self.auxiliary.clone(), timestamp, now);
    }

    /// Take a snapshot from the collaboration feed
    ///
    /// The synced content and cursors always reach the projector. The local
    /// buffer is replaced unless the remote content policy holds it back;
    /// the caret is then restored synchronously and the host must set it
    /// before the next paint. A save that is pending or in flight at that
    /// point is superseded by one carrying the replaced buffer.
    pub fn apply_remote_sync(&mut self, snapshot: SyncSnapshot, now: Millis) -> Option<RemoteApply> {
        if !self.is_active() {
            return None;
        }

        let SyncSnapshot { content, cursors } = snapshot;
        self.projector.update_snapshot(&content, cursors, now);

        if content == self.document.full_content() {
            self.remote_deferred = false;
            return Some(RemoteApply::Identical);
        }

        if self.config.remote_content_policy == RemoteContentPolicy::DeferWhileDirty && self.autosave.is_dirty() {
            if !self.remote_deferred {
                log::info!("remote content held back; local edits are unsaved");
                self.notices.push(Notice::new(
                    NoticeKind::RemoteDeferred,
                    "Remote changes will appear once your edits are saved",
                ));
            }
            self.remote_deferred = true;
            return Some(RemoteApply::Deferred);
        }

        self.remote_deferred = false;
        let previous = self.document.replace_full(content);
        if self.autosave.is_pending() || self.autosave.in_flight().is_some() {
            // An older save would otherwise persist the replaced buffer
            log::info!("remote content replaced unsaved edits; re-issuing the save");
            self.schedule_save(now);
        }
        let restoration = self
            .preserver
            .on_content_change(&previous, self.document.display_content(), now);
        Some(RemoteApply::Applied(restoration))
    }

    /// Drive every timer up to `now`
    pub fn tick(&mut self, now: Millis) -> EditorEffects {
        let mut effects = EditorEffects::default();
        if !self.is_active() {
            return effects;
        }

        self.preserver.tick(now);

        if let Some(frame) = self.overlay.poll(now, self.geometry.as_ref()) {
            effects.frame_requested |= self.projector.on_frame_changed(frame);
        }

        let projector = self.projector.tick(now);
        effects.frame_requested |= projector.frame_requested;
        effects.render |= projector.render;

        if let Some(due) = self.autosave.poll(now) {
            effects.saves.push(due);
        }
        effects
    }

    /// Run the pending cursor computation; true when the overlay should redraw
    pub fn on_animation_frame(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.projector.on_animation_frame()
    }

    /// Persist right away, skipping the debounce
    pub fn save_now(&mut self, now: Millis) -> Option<DueSave> {
        if !self.is_active() {
            return None;
        }
        let request = SaveRequest {
            content: self.document.full_content().to_string(),
            dirty: self.autosave.is_dirty(),
            auxiliary: self.auxiliary.clone(),
            timestamp: self.timestamp(now),
        };
        self.autosave.save_now(request, now)
    }

    /// Report the result of persisting `ticket`
    pub fn complete_save(&mut self, ticket: SaveTicket, result: Result<(), PersistError>) -> SaveOutcome {
        let outcome = self.autosave.complete(ticket, result);
        match &outcome {
            SaveOutcome::Failed(e) => {
                self.notices.push(Notice::new(NoticeKind::SaveFailed, e.to_string()));
            }
            SaveOutcome::Saved if self.remote_deferred => {
                // The held snapshot may predate this save; the next feed
                // delivery is applied instead.
                log::debug!("local edits saved; accepting the next remote snapshot");
                self.remote_deferred = false;
            }
            _ => {}
        }
        outcome
    }

    /// Earliest host time at which `tick` has work to do
    pub fn next_deadline(&self) -> Option<Millis> {
        if !self.is_active() {
            return None;
        }
        [
            self.preserver.next_deadline(),
            self.overlay.next_deadline(),
            self.projector.next_deadline(),
            self.autosave.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Cancel every timer; later events and completions are ignored
    pub fn dispose(&mut self) {
        if !self.is_active() {
            return;
        }
        self.preserver.dispose();
        self.projector.dispose();
        self.overlay.dispose();
        self.autosave.dispose();
        self.lifecycle = Lifecycle::Disposed;
        log::debug!("editor disposed");
    }
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RemoteCursor;
    use crate::sync::cursor_preserver::Restoration;
    use crate::text::TextRange;

    fn editor() -> SyncEditor {
        let frame = OverlayFrame { left: 0.0, top: 0.0, width: 800.0, height: 400.0 };
        SyncEditor::with_monospace(EditorConfig::default(), Box::new(frame))
    }

    fn typed(content: &str, cursor_offset: usize) -> TextChange {
        TextChange { new_content: content.to_string(), cursor_offset }
    }

    #[test]
    fn test_typing_schedules_a_save() {
        let mut editor = editor();
        assert!(editor.on_text_change(typed("INT.", 4), 0));
        assert!(editor.is_dirty());
        assert_eq!(editor.next_deadline(), Some(500));

        assert!(editor.tick(1_999).saves.is_empty());
        let saves = editor.tick(2_000).saves;
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].request.content, "INT.");
    }

    #[test]
    fn test_unchanged_text_is_not_saved() {
        let mut editor = editor().with_content("same");
        assert!(!editor.on_text_change(typed("same", 2), 0));
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_paste_normalizes_line_endings() {
        let mut editor = editor().with_content("AB");
        let caret = editor.on_paste(
            PasteEvent { clipboard_text: "x\r\ny\rz".into(), selection_range: TextRange::new(1, 2) },
            0,
        );
        assert_eq!(caret, Some(6));
        assert_eq!(editor.display_content(), "Ax\ny\nz");
        assert_eq!(editor.cursor_offset(), 6);
    }

    #[test]
    fn test_remote_sync_restores_caret() {
        let mut editor = editor().with_content("FADE IN:\nINT. HOUSE");
        editor.on_selection_change(19);

        let applied = editor.apply_remote_sync(
            SyncSnapshot { content: "[[scene: 1]]\nFADE IN:\nEXT. INT. HOUSE".into(), cursors: vec![] },
            0,
        );
        assert_eq!(applied, Some(RemoteApply::Applied(Restoration::Restored(24))));
        assert_eq!(editor.display_content(), "FADE IN:\nEXT. INT. HOUSE");
    }

    #[test]
    fn test_remote_content_deferred_while_dirty() {
        let config = EditorConfig { remote_content_policy: RemoteContentPolicy::DeferWhileDirty, ..EditorConfig::default() };
        let mut editor = SyncEditor::with_monospace(config, Box::new(OverlayFrame::default())).with_content("draft");
        editor.on_text_change(typed("draft 2", 7), 0);

        let snapshot = SyncSnapshot { content: "remote".into(), cursors: vec![RemoteCursor::new("bo", 3)] };
        assert_eq!(editor.apply_remote_sync(snapshot.clone(), 10), Some(RemoteApply::Deferred));
        assert_eq!(editor.display_content(), "draft 2");
        assert_eq!(editor.projector().synced_content(), "remote");

        // Only one notice for a run of deferred snapshots
        editor.apply_remote_sync(snapshot, 20);
        let notices = editor.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::RemoteDeferred);

        let due = editor.tick(2_000).saves.remove(0);
        assert_eq!(editor.complete_save(due.ticket, Ok(())), SaveOutcome::Saved);

        let snapshot = SyncSnapshot { content: "remote 2".into(), cursors: vec![] };
        assert!(matches!(editor.apply_remote_sync(snapshot, 3_000), Some(RemoteApply::Applied(_))));
        assert_eq!(editor.display_content(), "remote 2");
    }

    #[test]
    fn test_remote_change_while_typing_replaces_without_restoring() {
        let mut editor = editor();
        editor.on_text_change(typed("mine", 4), 0);

        let applied = editor.apply_remote_sync(SyncSnapshot { content: "theirs".into(), cursors: vec![] }, 100);
        assert_eq!(applied, Some(RemoteApply::Applied(Restoration::Skipped)));
        assert_eq!(editor.display_content(), "theirs");
        assert!(editor.take_notices().is_empty());
    }

    #[test]
    fn test_pending_save_reissued_with_remote_content() {
        let mut editor = editor();
        editor.on_text_change(typed("mine", 4), 0);
        editor.apply_remote_sync(SyncSnapshot { content: "theirs".into(), cursors: vec![] }, 1_000);

        assert!(editor.tick(2_000).saves.is_empty());
        let saves = editor.tick(3_000).saves;
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].request.content, "theirs");
    }

    #[test]
    fn test_in_flight_save_superseded_by_remote_content() {
        let mut editor = editor();
        editor.on_text_change(typed("mine", 4), 0);
        let stale = editor.save_now(10).unwrap();
        editor.apply_remote_sync(SyncSnapshot { content: "theirs".into(), cursors: vec![] }, 20);

        assert_eq!(editor.complete_save(stale.ticket, Ok(())), SaveOutcome::Superseded);
        assert!(editor.is_dirty());
        let due = editor.tick(2_020).saves.remove(0);
        assert_eq!(due.request.content, "theirs");
        assert_eq!(editor.complete_save(due.ticket, Ok(())), SaveOutcome::Saved);
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_clean_remote_replace_schedules_nothing() {
        let mut editor = editor().with_content("a");
        editor.apply_remote_sync(SyncSnapshot { content: "b".into(), cursors: vec![] }, 0);
        assert!(!editor.is_dirty());
        assert!(editor.tick(10_000).saves.is_empty());
    }

    #[test]
    fn test_failed_save_emits_notice() {
        let mut editor = editor();
        editor.on_text_change(typed("x", 1), 0);
        let due = editor.save_now(10).unwrap();
        assert_eq!(editor.next_deadline(), Some(500));

        let outcome = editor.complete_save(due.ticket, Err(PersistError::Network("timeout".into())));
        assert!(matches!(outcome, SaveOutcome::Failed(_)));
        assert!(editor.is_dirty());

        let notices = editor.take_notices();
        assert_eq!(notices[0].kind, NoticeKind::SaveFailed);
        assert!(notices[0].message.contains("timeout"));
        assert!(editor.take_notices().is_empty());
    }

    #[test]
    fn test_timestamp_uses_time_origin() {
        let mut editor = editor().with_time_origin(1_700_000_000_000);
        editor.on_text_change(typed("x", 1), 250);
        let due = editor.tick(2_250).saves.remove(0);
        assert_eq!(due.request.timestamp, 1_700_000_000_250);
    }

    #[test]
    fn test_mount_then_remote_cursors_render() {
        let mut editor = editor();
        assert!(editor.mount());
        assert!(editor.on_animation_frame());

        editor.apply_remote_sync(
            SyncSnapshot { content: "hello".into(), cursors: vec![RemoteCursor::new("bo", 5)] },
            0,
        );
        let effects = editor.tick(100);
        assert!(effects.frame_requested);
        assert!(editor.on_animation_frame());
        assert_eq!(editor.visible_cursors().len(), 1);
    }

    #[test]
    fn test_dispose_makes_everything_a_no_op() {
        let mut editor = editor();
        editor.on_text_change(typed("unsaved", 7), 0);
        editor.dispose();

        assert_eq!(editor.next_deadline(), None);
        assert!(editor.tick(10_000).is_empty());
        assert!(!editor.on_text_change(typed("more", 4), 10_001));
        assert_eq!(editor.apply_remote_sync(SyncSnapshot { content: "r".into(), cursors: vec![] }, 10_002), None);
        assert_eq!(editor.save_now(10_003), None);
        assert_eq!(editor.display_content(), "unsaved");
    }
}
