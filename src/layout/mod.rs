//! Text layout oracle
//!
//! The remote cursor projector needs to know where a char index lands in
//! pixels. The browser answers that with a hidden mirror element; inside the
//! core the question goes through the `TextLayoutOracle` trait so the
//! technique stays swappable and the answers stay deterministic under test.

pub mod monospace;

pub use monospace::{FontMetrics, MonospaceLayout};

use crate::models::Point;

pub trait TextLayoutOracle {
    /// Content-space pixel position of the caret before `char_index`
    ///
    /// Indices past the end of `text` resolve to the end of the text.
    fn caret_position(&self, text: &str, char_index: usize) -> Point;

    /// Width available to the text changed (resize)
    fn set_wrap_width(&mut self, width: f32);

    /// Resolve several indices against the same text
    fn caret_positions(&self, text: &str, indices: &[usize]) -> Vec<Point> {
        indices
            .iter()
            .map(|&index| self.caret_position(text, index))
            .collect()
    }
}

impl<T: TextLayoutOracle + ?Sized> TextLayoutOracle for Box<T> {
    fn caret_position(&self, text: &str, char_index: usize) -> Point {
        (**self).caret_position(text, char_index)
    }

    fn set_wrap_width(&mut self, width: f32) {
        (**self).set_wrap_width(width)
    }

    fn caret_positions(&self, text: &str, indices: &[usize]) -> Vec<Point> {
        (**self).caret_positions(text, indices)
    }
}
