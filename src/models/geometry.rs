//! Pixel geometry shared by the overlay and the cursor projector

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Translate from content space into the scrolled viewport
    pub fn scrolled(&self, scroll: ScrollOffset) -> Self {
        Self {
            x: self.x - scroll.scroll_left,
            y: self.y - scroll.scroll_top,
        }
    }
}

/// Caret position (and optional selection endpoints) in content space
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PixelPosition {
    pub x: f32,
    pub y: f32,
    pub selection_start: Option<Point>,
    pub selection_end: Option<Point>,
}

impl PixelPosition {
    pub fn caret(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Host element geometry relative to its positioned ancestor
///
/// `width`/`height` are the *client* size, so scrollbars are excluded.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub struct OverlayFrame {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl OverlayFrame {
    /// Whether a viewport point lies inside the frame grown by `margin` on every side
    ///
    /// Bounds are inclusive: a point exactly `margin` past an edge is inside.
    pub fn contains_with_margin(&self, point: Point, margin: f32) -> bool {
        point.x >= -margin
            && point.x <= self.width + margin
            && point.y >= -margin
            && point.y <= self.height + margin
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScrollOffset {
    pub scroll_top: f32,
    pub scroll_left: f32,
}

impl ScrollOffset {
    pub fn new(scroll_top: f32, scroll_left: f32) -> Self {
        Self {
            scroll_top,
            scroll_left,
        }
    }
}
