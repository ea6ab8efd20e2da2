//! Fixed-pitch layout
//!
//! Screenplays are set in a fixed-pitch face (Courier by convention), so a
//! char grid with `pre-wrap` soft wrapping reproduces what the browser
//! mirror element measures.

use serde::{Deserialize, Serialize};

use super::TextLayoutOracle;
use crate::models::Point;

/// Measured font and box metrics, as reported by the host
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FontMetrics {
    /// Advance width of one glyph in pixels
    pub char_width: f32,
    /// Line box height in pixels
    pub line_height: f32,
    pub padding_left: f32,
    pub padding_top: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        // 12pt Courier at 96dpi
        Self {
            char_width: 9.6,
            line_height: 19.2,
            padding_left: 0.0,
            padding_top: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MonospaceLayout {
    metrics: FontMetrics,
    /// Columns per visual row; `None` disables wrapping
    columns: Option<usize>,
}

impl MonospaceLayout {
    pub fn new(metrics: FontMetrics) -> Self {
        Self {
            metrics,
            columns: None,
        }
    }

    pub fn with_wrap_width(mut self, width: f32) -> Self {
        self.set_wrap_width(width);
        self
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    pub fn columns(&self) -> Option<usize> {
        self.columns
    }

    /// Visual (row, column) of the caret before `char_index`
    pub fn locate(&self, text: &str, char_index: usize) -> (usize, usize) {
        let mut row = 0;
        let mut line_start = 0;

        for line in text.split('\n') {
            let chars: Vec<char> = line.chars().collect();
            let starts = self.row_starts(&chars);

            if char_index <= line_start + chars.len() {
                let local = char_index - line_start;
                let r = starts.iter().rposition(|&s| s <= local).unwrap_or(0);
                return (row + r, local - starts[r]);
            }

            row += starts.len();
            line_start += chars.len() + 1;
        }

        // Past the end: stick to the end of the last line
        let last = text.rsplit('\n').next().unwrap_or("");
        let chars: Vec<char> = last.chars().collect();
        let starts = self.row_starts(&chars);
        let last_start = starts.last().copied().unwrap_or(0);
        (row.saturating_sub(1), chars.len() - last_start)
    }

    /// Char indices (within one logical line) where each visual row begins
    fn row_starts(&self, chars: &[char]) -> Vec<usize> {
        let mut starts = vec![0];
        let Some(columns) = self.columns else {
            return starts;
        };

        let n = chars.len();
        let mut row_start = 0;
        let mut i = 0;

        while i < n {
            let is_space = chars[i] == ' ';
            let mut j = i;
            while j < n && (chars[j] == ' ') == is_space {
                j += 1;
            }

            // Spaces hang off the end of a row; only words wrap
            if !is_space {
                if i > row_start && (i - row_start) + (j - i) > columns {
                    row_start = i;
                    starts.push(i);
                }
                while j - row_start > columns {
                    row_start += columns;
                    starts.push(row_start);
                }
            }
            i = j;
        }

        starts
    }
}

impl Default for MonospaceLayout {
    fn default() -> Self {
        Self::new(FontMetrics::default())
    }
}

impl TextLayoutOracle for MonospaceLayout {
    fn caret_position(&self, text: &str, char_index: usize) -> Point {
        let (row, col) = self.locate(text, char_index);
        Point::new(
            self.metrics.padding_left + col as f32 * self.metrics.char_width,
            self.metrics.padding_top + row as f32 * self.metrics.line_height,
        )
    }

    fn set_wrap_width(&mut self, width: f32) {
        let usable = width - 2.0 * self.metrics.padding_left;
        self.columns = if usable.is_finite() && usable > 0.0 && self.metrics.char_width > 0.0 {
            Some(((usable / self.metrics.char_width).floor() as usize).max(1))
        } else {
            None
        };
    }
}
