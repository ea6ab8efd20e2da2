//! Remote collaborator cursor projection
//!
//! Turns each collaborator's char offset into pixel coordinates for the
//! overlay layer. All geometry is derived from the *synced* content (the
//! snapshot the collaboration feed confirmed), never from the local buffer,
//! so in-flight local edits can't push remote cursors out of place. Feed
//! offsets count full content (markers included); they are mapped into the
//! synced display text before layout.
//!
//! Three triggers feed the projector, each with its own timing:
//!
//! - snapshot key change: 100 ms debounce, then a full recompute
//! - scroll: 16 ms throttle, re-cull only (no layout work)
//! - frame change after resize: immediate full recompute
//!
//! A full recompute never runs inline. It requests an animation frame from
//! the host and runs in `on_animation_frame`, batched with rendering. While
//! a frame is outstanding, further recompute triggers are dropped; the frame
//! reads the latest snapshot anyway.

use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::layout::TextLayoutOracle;
use crate::models::{palette_color, OverlayFrame, PixelPosition, Point, RemoteCursor, ScrollOffset};
use crate::text::Projection;
use crate::utils::scheduler::{Millis, ScheduledTask, Throttle};

/// A cursor ready to draw, in viewport coordinates
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VisibleCursor {
    pub user_id: String,
    pub x: f32,
    pub y: f32,
    pub color: String,
    pub selection_start: Option<Point>,
    pub selection_end: Option<Point>,
}

/// Cached content-space result for one collaborator
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectedCursor {
    pub user_id: String,
    pub color: String,
    pub position: PixelPosition,
}

/// Why a recompute was requested
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecomputeReason {
    Snapshot,
    Geometry,
}

/// Geometry computation lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComputeState {
    Idle,
    AwaitingFrame(RecomputeReason),
}

/// Timing knobs for the projector
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectorTiming {
    pub recompute_debounce: Millis,
    pub scroll_throttle: Millis,
    pub margin: f32,
}

impl Default for ProjectorTiming {
    fn default() -> Self {
        Self {
            recompute_debounce: 100,
            scroll_throttle: 16,
            margin: 50.0,
        }
    }
}

/// What a call to `tick` asks of the host
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProjectorTick {
    /// Schedule an animation frame and call `on_animation_frame` from it
    pub frame_requested: bool,
    /// The visible cursor list may have changed
    pub render: bool,
}

pub struct RemoteCursorProjector<L: TextLayoutOracle> {
    layout: L,
    timing: ProjectorTiming,
    local_user_id: Option<String>,

    synced_content: String,
    synced: Projection,
    synced_revision: u64,
    cursors: Vec<RemoteCursor>,

    /// Key of the latest snapshot seen
    current_key: String,
    /// Key the cached positions were computed from
    computed_key: Option<String>,
    positions: Vec<ProjectedCursor>,

    scroll: ScrollOffset,
    frame: OverlayFrame,

    state: ComputeState,
    recompute: ScheduledTask<()>,
    scroll_throttle: Throttle<ScrollOffset>,
    render_pending: bool,
}

impl<L: TextLayoutOracle> RemoteCursorProjector<L> {
    pub fn new(layout: L, timing: ProjectorTiming) -> Self {
        Self {
            layout,
            timing,
            local_user_id: None,
            synced_content: String::new(),
            synced: Projection::build(""),
            synced_revision: 0,
            cursors: Vec::new(),
            current_key: String::new(),
            computed_key: None,
            positions: Vec::new(),
            scroll: ScrollOffset::default(),
            frame: OverlayFrame::default(),
            state: ComputeState::Idle,
            recompute: ScheduledTask::new(),
            scroll_throttle: Throttle::new(timing.scroll_throttle),
            render_pending: false,
        }
    }

    pub fn with_local_user(mut self, user_id: Option<String>) -> Self {
        self.local_user_id = user_id;
        self
    }

    pub fn state(&self) -> ComputeState {
        self.state
    }

    pub fn synced_content(&self) -> &str {
        &self.synced_content
    }

    pub fn cursors(&self) -> &[RemoteCursor] {
        &self.cursors
    }

    pub fn positions(&self) -> &[ProjectedCursor] {
        &self.positions
    }

    pub fn frame(&self) -> OverlayFrame {
        self.frame
    }

    pub fn scroll(&self) -> ScrollOffset {
        self.scroll
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    /// Accept a new snapshot from the collaboration feed
    ///
    /// Cursors are replaced wholesale. Returns true when the snapshot key
    /// changed and a recompute was scheduled.
    pub fn update_snapshot(&mut self, content: &str, cursors: Vec<RemoteCursor>, now: Millis) -> bool {
        if content != self.synced_content {
            self.synced_content = content.to_string();
            self.synced = Projection::build(content);
            self.synced_revision += 1;
        }

        let mut cursors: Vec<RemoteCursor> = cursors
            .into_iter()
            .filter(|c| self.local_user_id.as_deref() != Some(c.user_id.as_str()))
            .map(|mut c| {
                if c.color.is_none() {
                    c.color = Some(palette_color(&c.user_id).to_string());
                }
                c
            })
            .collect();
        cursors.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        self.cursors = cursors;

        let key = self.snapshot_key();
        if key == self.current_key {
            return false;
        }

        log::trace!("remote cursor key changed: {}", key);
        self.current_key = key;
        self.recompute
            .schedule(now, self.timing.recompute_debounce, ());
        true
    }

    /// Stable key over every `(user, offset)` pair, selections and content revision
    fn snapshot_key(&self) -> String {
        let mut key = format!("r{}", self.synced_revision);
        for cursor in &self.cursors {
            key.push('|');
            key.push_str(&cursor.user_id);
            key.push(':');
            key.push_str(&cursor.offset.to_string());
            if let Some((start, end)) = cursor.selection() {
                key.push_str(&format!("[{}-{}]", start, end));
            }
        }
        key
    }

    /// Record a scroll; re-culling is throttled
    pub fn on_scroll(&mut self, scroll: ScrollOffset, now: Millis) -> bool {
        match self.scroll_throttle.offer(now, scroll) {
            Some(scroll) => {
                self.apply_scroll(scroll);
                true
            }
            None => false,
        }
    }

    fn apply_scroll(&mut self, scroll: ScrollOffset) {
        if self.scroll != scroll {
            self.scroll = scroll;
            self.render_pending = true;
        }
    }

    /// The overlay frame was re-measured (mount or settled resize)
    pub fn on_frame_changed(&mut self, frame: OverlayFrame) -> bool {
        self.frame = frame;
        self.layout.set_wrap_width(frame.width);
        self.render_pending = true;
        self.request_compute(RecomputeReason::Geometry)
    }

    /// Drive debounce and throttle timers
    pub fn tick(&mut self, now: Millis) -> ProjectorTick {
        let mut tick = ProjectorTick::default();

        if self.recompute.poll(now).is_some() {
            if self.computed_key.as_deref() == Some(self.current_key.as_str()) {
                log::trace!("remote cursor key unchanged; skipping recompute");
            } else {
                tick.frame_requested = self.request_compute(RecomputeReason::Snapshot);
            }
        }

        if let Some(scroll) = self.scroll_throttle.poll(now) {
            self.apply_scroll(scroll);
        }

        tick.render = self.take_render_pending();
        tick
    }

    /// Move to `AwaitingFrame`, or drop the trigger if a frame is already pending
    fn request_compute(&mut self, reason: RecomputeReason) -> bool {
        match self.state {
            ComputeState::AwaitingFrame(pending) => {
                log::trace!("dropping {:?} recompute; {:?} frame already pending", reason, pending);
                false
            }
            ComputeState::Idle => {
                self.state = ComputeState::AwaitingFrame(reason);
                true
            }
        }
    }

    /// Run the pending geometry computation
    ///
    /// Returns false when no frame was pending (stale or post-dispose frame).
    pub fn on_animation_frame(&mut self) -> bool {
        let ComputeState::AwaitingFrame(reason) = self.state else {
            return false;
        };

        let content_len = self.synced.full_len();
        let positions: Vec<ProjectedCursor> = self
            .cursors
            .iter()
            .map(|cursor| ProjectedCursor {
                user_id: cursor.user_id.clone(),
                color: cursor
                    .color
                    .clone()
                    .unwrap_or_else(|| palette_color(&cursor.user_id).to_string()),
                position: self.pixel_position(cursor, content_len),
            })
            .collect();

        self.positions = positions;
        self.computed_key = Some(self.current_key.clone());
        self.state = ComputeState::Idle;
        self.render_pending = true;
        log::debug!(
            "projected {} remote cursors ({:?})",
            self.positions.len(),
            reason
        );
        true
    }

    fn pixel_position(&self, cursor: &RemoteCursor, content_len: usize) -> PixelPosition {
        let clamp = |offset: usize| {
            if offset > content_len {
                log::debug!(
                    "{} for {}",
                    SyncError::MappingOutOfRange { offset, len: content_len },
                    cursor.user_id
                );
            }
            self.synced.full_to_display(offset.min(content_len))
        };
        let text = self.synced.display();

        let caret = self.layout.caret_position(text, clamp(cursor.offset));

        let (selection_start, selection_end) = match cursor.selection() {
            Some((start, end)) => {
                let points = self
                    .layout
                    .caret_positions(text, &[clamp(start), clamp(end)]);
                (points.first().copied(), points.get(1).copied())
            }
            None => (None, None),
        };

        PixelPosition {
            x: caret.x,
            y: caret.y,
            selection_start,
            selection_end,
        }
    }

    /// Cursors inside the frame (plus margin), adjusted for scroll
    pub fn visible_cursors(&self) -> Vec<VisibleCursor> {
        let margin = self.timing.margin;
        self.positions
            .iter()
            .filter_map(|projected| {
                let caret = projected.position.caret().scrolled(self.scroll);
                if !self.frame.contains_with_margin(caret, margin) {
                    return None;
                }

                let visible = |point: Option<Point>| {
                    point
                        .map(|p| p.scrolled(self.scroll))
                        .filter(|p| self.frame.contains_with_margin(*p, margin))
                };

                Some(VisibleCursor {
                    user_id: projected.user_id.clone(),
                    x: caret.x,
                    y: caret.y,
                    color: projected.color.clone(),
                    selection_start: visible(projected.position.selection_start),
                    selection_end: visible(projected.position.selection_end),
                })
            })
            .collect()
    }

    fn take_render_pending(&mut self) -> bool {
        std::mem::take(&mut self.render_pending)
    }

    /// Earliest host time at which `tick` has work to do
    pub fn next_deadline(&self) -> Option<Millis> {
        match (self.recompute.due_at(), self.scroll_throttle.due_at()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Cancel every timer and forget any pending frame
    pub fn dispose(&mut self) {
        self.recompute.cancel();
        self.scroll_throttle.cancel();
        self.state = ComputeState::Idle;
        self.render_pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{FontMetrics, MonospaceLayout};

    fn projector() -> RemoteCursorProjector<MonospaceLayout> {
        let layout = MonospaceLayout::new(FontMetrics {
            char_width: 10.0,
            line_height: 20.0,
            padding_left: 0.0,
            padding_top: 0.0,
        });
        let mut projector = RemoteCursorProjector::new(layout, ProjectorTiming::default());
        projector.frame = OverlayFrame { left: 0.0, top: 0.0, width: 1_000.0, height: 300.0 };
        projector
    }

    #[test]
    fn test_snapshot_is_debounced_then_needs_a_frame() {
        let mut projector = projector();
        assert!(projector.update_snapshot("hello", vec![RemoteCursor::new("bo", 2)], 0));

        assert_eq!(projector.tick(99), ProjectorTick::default());
        let tick = projector.tick(100);
        assert!(tick.frame_requested);
        assert!(projector.visible_cursors().is_empty());

        assert!(projector.on_animation_frame());
        let visible = projector.visible_cursors();
        assert_eq!(visible.len(), 1);
        assert_eq!((visible[0].x, visible[0].y), (20.0, 0.0));
    }

    #[test]
    fn test_unchanged_key_is_a_no_op() {
        let mut projector = projector();
        projector.update_snapshot("hello", vec![RemoteCursor::new("bo", 2)], 0);
        projector.tick(100);
        projector.on_animation_frame();

        assert!(!projector.update_snapshot("hello", vec![RemoteCursor::new("bo", 2)], 200));
        assert!(!projector.tick(400).frame_requested);
        assert_eq!(projector.next_deadline(), None);
    }

    #[test]
    fn test_trigger_during_pending_frame_is_dropped() {
        let mut projector = projector();
        projector.update_snapshot("hello", vec![RemoteCursor::new("bo", 1)], 0);
        assert!(projector.tick(100).frame_requested);

        projector.update_snapshot("hello", vec![RemoteCursor::new("bo", 4)], 110);
        assert!(!projector.tick(210).frame_requested);
        assert_eq!(projector.state(), ComputeState::AwaitingFrame(RecomputeReason::Snapshot));

        // The pending frame still reads the latest snapshot
        projector.on_animation_frame();
        assert_eq!(projector.visible_cursors()[0].x, 40.0);
    }

    #[test]
    fn test_local_user_filtered_and_colors_assigned() {
        let mut projector = projector().with_local_user(Some("me".into()));
        projector.update_snapshot(
            "text",
            vec![
                RemoteCursor::new("zed", 1),
                RemoteCursor::new("me", 0),
                RemoteCursor::new("amy", 2).with_color("#000"),
            ],
            0,
        );

        let ids: Vec<_> = projector.cursors().iter().map(|c| c.user_id.as_str()).collect();
        assert_eq!(ids, vec!["amy", "zed"]);
        assert_eq!(projector.cursors()[0].color.as_deref(), Some("#000"));
        assert_eq!(projector.cursors()[1].color.as_deref(), Some(palette_color("zed")));
    }

    #[test]
    fn test_scroll_only_reculls() {
        let mut projector = projector();
        let content = "line\n".repeat(40);
        projector.update_snapshot(&content, vec![RemoteCursor::new("bo", 5 * 30)], 0);
        projector.tick(100);
        projector.on_animation_frame();

        // Row 30 sits at y = 600, outside 300 + 50
        assert!(projector.visible_cursors().is_empty());

        assert!(projector.on_scroll(ScrollOffset::new(400.0, 0.0), 200));
        assert_eq!(projector.state(), ComputeState::Idle);
        let visible = projector.visible_cursors();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].y, 200.0);
    }

    #[test]
    fn test_scroll_is_throttled_with_trailing_update() {
        let mut projector = projector();
        assert!(projector.on_scroll(ScrollOffset::new(10.0, 0.0), 0));
        assert!(!projector.on_scroll(ScrollOffset::new(20.0, 0.0), 5));
        assert_eq!(projector.scroll().scroll_top, 10.0);

        let tick = projector.tick(16);
        assert!(tick.render);
        assert_eq!(projector.scroll().scroll_top, 20.0);
    }

    #[test]
    fn test_offset_past_synced_content_clamps() {
        let mut projector = projector();
        projector.update_snapshot("abc", vec![RemoteCursor::new("bo", 99)], 0);
        projector.tick(100);
        projector.on_animation_frame();
        assert_eq!(projector.visible_cursors()[0].x, 30.0);
    }

    #[test]
    fn test_offsets_mapped_through_markers() {
        let mut projector = projector();
        // "[[scene: 1]]\n" is 13 chars and never rendered
        projector.update_snapshot("[[scene: 1]]\nJOHN\nHi.", vec![RemoteCursor::new("bo", 20)], 0);
        projector.tick(100);
        projector.on_animation_frame();

        let cursor = &projector.visible_cursors()[0];
        assert_eq!((cursor.x, cursor.y), (20.0, 20.0));
    }

    #[test]
    fn test_selection_endpoints_projected() {
        let mut projector = projector();
        projector.update_snapshot("ab\ncd", vec![RemoteCursor::new("bo", 4).with_selection(4, 1)], 0);
        projector.tick(100);
        projector.on_animation_frame();

        let cursor = &projector.visible_cursors()[0];
        assert_eq!(cursor.selection_start, Some(Point::new(10.0, 0.0)));
        assert_eq!(cursor.selection_end, Some(Point::new(10.0, 20.0)));
    }

    #[test]
    fn test_frame_change_recomputes_without_key_change() {
        let mut projector = projector();
        projector.update_snapshot("hello world", vec![RemoteCursor::new("bo", 11)], 0);
        projector.tick(100);
        projector.on_animation_frame();
        assert_eq!(projector.visible_cursors()[0].y, 0.0);

        let narrow = OverlayFrame { left: 0.0, top: 0.0, width: 60.0, height: 300.0 };
        assert!(projector.on_frame_changed(narrow));
        projector.on_animation_frame();
        // 6 columns: "hello " | "world"
        assert_eq!(projector.visible_cursors()[0].y, 20.0);
    }

    #[test]
    fn test_dispose_drops_pending_work() {
        let mut projector = projector();
        projector.update_snapshot("hello", vec![RemoteCursor::new("bo", 2)], 0);
        projector.dispose();
        assert_eq!(projector.next_deadline(), None);
        assert!(!projector.tick(1_000).frame_requested);
        assert!(!projector.on_animation_frame());
    }
}
