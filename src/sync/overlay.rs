//! Overlay frame tracking
//!
//! Remote cursors are drawn in an absolutely positioned layer laid over the
//! editing surface. The layer needs the surface's offset within its
//! positioned ancestor and its visible client size. Both only change on
//! resize; scrolling moves the text, not the frame.

use crate::models::OverlayFrame;
use crate::utils::scheduler::{Millis, ScheduledTask};

/// Something that can report the editing surface's geometry
pub trait GeometrySource {
    /// Current frame, or `None` when the surface is not attached
    fn measure(&self) -> Option<OverlayFrame>;
}

impl GeometrySource for OverlayFrame {
    fn measure(&self) -> Option<OverlayFrame> {
        Some(*self)
    }
}

#[derive(Debug)]
pub struct OverlayPositioner {
    frame: Option<OverlayFrame>,
    settle: Millis,
    resize: ScheduledTask<()>,
}

impl OverlayPositioner {
    pub fn new(settle: Millis) -> Self {
        Self {
            frame: None,
            settle,
            resize: ScheduledTask::new(),
        }
    }

    /// Take the first measurement
    pub fn mount(&mut self, source: &dyn GeometrySource) -> Option<OverlayFrame> {
        self.remeasure(source)
    }

    /// A window resize happened; re-measure once things settle
    pub fn on_resize(&mut self, now: Millis) {
        self.resize.schedule(now, self.settle, ());
    }

    /// Re-measure if the resize debounce has elapsed
    ///
    /// Returns the new frame when a measurement was taken.
    pub fn poll(&mut self, now: Millis, source: &dyn GeometrySource) -> Option<OverlayFrame> {
        self.resize.poll(now)?;
        self.remeasure(source)
    }

    fn remeasure(&mut self, source: &dyn GeometrySource) -> Option<OverlayFrame> {
        match source.measure() {
            Some(frame) => {
                if self.frame != Some(frame) {
                    log::debug!(
                        "overlay frame {}x{} at ({}, {})",
                        frame.width,
                        frame.height,
                        frame.left,
                        frame.top
                    );
                }
                self.frame = Some(frame);
                Some(frame)
            }
            None => {
                log::warn!("editing surface not attached; keeping previous overlay frame");
                None
            }
        }
    }

    /// Last measured frame (zero-sized before mount)
    pub fn frame(&self) -> OverlayFrame {
        self.frame.unwrap_or_default()
    }

    pub fn is_mounted(&self) -> bool {
        self.frame.is_some()
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.resize.due_at()
    }

    pub fn dispose(&mut self) {
        self.resize.cancel();
    }
}
