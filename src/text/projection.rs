//! Full content ⇄ display content projection
//!
//! Full content is the authoritative screenplay text. It may carry whole-line
//! structural markers such as `[[scene: 7f3a]]` that tie a block of text to
//! external entities. Display content is the same text with those lines
//! removed, and is what the user actually sees and edits.
//!
//! Offsets in both spaces are char offsets. Mapping never fails: every
//! out-of-range input is clamped.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::offsets::{char_len, char_to_byte, common_prefix_len, common_suffix_len};
use crate::error::ProjectionError;

lazy_static! {
    /// A complete marker line: `[[kind: value]]`
    static ref MARKER: Regex = Regex::new(r"^\[\[([A-Za-z][\w-]*):(.*)\]\]$").unwrap();

    /// Anything that starts out looking like a marker
    static ref MARKER_OPEN: Regex = Regex::new(r"^\[\[\s*[\w-]*\s*:").unwrap();
}

/// A parsed structural marker line
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StructuralMarker {
    /// Zero-based line index in full content
    pub line: usize,
    pub kind: String,
    pub value: String,
}

/// A region of full content that is absent from display content
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrippedSpan {
    /// Start char offset in full content (inclusive)
    pub start: usize,
    /// End char offset in full content (exclusive)
    pub end: usize,
    /// Display offset where the span was removed
    pub display_at: usize,
}

impl StrippedSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether a full-content offset falls inside this span
    pub fn contains(&self, full_offset: usize) -> bool {
        full_offset >= self.start && full_offset < self.end
    }
}

/// The projection of one full-content string
///
/// Built once per content change and then used for any number of offset
/// mappings in either direction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Projection {
    display: String,
    spans: Vec<StrippedSpan>,
    markers: Vec<StructuralMarker>,
    full_len: usize,
    display_len: usize,
}

impl Projection {
    /// Project full content
    ///
    /// A malformed marker line is logged and shown as ordinary text; the
    /// well-formed markers around it are still stripped.
    pub fn build(full: &str) -> Self {
        let (projection, malformed) = Self::scan(full);
        for e in malformed {
            log::warn!("{}; showing the line as text", e);
        }
        projection
    }

    /// Project full content, reporting the first malformed marker
    pub fn try_build(full: &str) -> Result<Self, ProjectionError> {
        let (projection, mut malformed) = Self::scan(full);
        if malformed.is_empty() {
            Ok(projection)
        } else {
            Err(malformed.remove(0))
        }
    }

    fn scan(full: &str) -> (Self, Vec<ProjectionError>) {
        let mut display = String::with_capacity(full.len());
        let mut spans = Vec::new();
        let mut markers = Vec::new();
        let mut malformed = Vec::new();
        let mut pos = 0;
        let mut display_pos = 0;

        for (line_idx, line) in full.split_inclusive('\n').enumerate() {
            let line_chars = char_len(line);
            let body = line.trim_end_matches(['\n', '\r']).trim();

            match parse_marker(body, line_idx) {
                Ok(Some(marker)) => {
                    spans.push(StrippedSpan {
                        start: pos,
                        end: pos + line_chars,
                        display_at: display_pos,
                    });
                    markers.push(marker);
                }
                other => {
                    if let Err(e) = other {
                        malformed.push(e);
                    }
                    display.push_str(line);
                    display_pos += line_chars;
                }
            }
            pos += line_chars;
        }

        let projection = Self {
            display,
            spans,
            markers,
            full_len: pos,
            display_len: display_pos,
        };
        (projection, malformed)
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn into_display(self) -> String {
        self.display
    }

    pub fn spans(&self) -> &[StrippedSpan] {
        &self.spans
    }

    pub fn markers(&self) -> &[StructuralMarker] {
        &self.markers
    }

    pub fn full_len(&self) -> usize {
        self.full_len
    }

    pub fn display_len(&self) -> usize {
        self.display_len
    }

    /// Whether a full offset falls inside a stripped region
    pub fn is_stripped(&self, full_offset: usize) -> bool {
        self.spans.iter().any(|span| span.contains(full_offset))
    }

    /// Map a full-content offset to display space
    ///
    /// Offsets inside a stripped span land on the span's display boundary.
    pub fn full_to_display(&self, full_offset: usize) -> usize {
        if full_offset > self.full_len {
            log::debug!(
                "full offset {} beyond content ({}), clamping",
                full_offset,
                self.full_len
            );
            return self.display_len;
        }

        let mut stripped = 0;
        for span in &self.spans {
            if full_offset >= span.end {
                stripped += span.len();
            } else if full_offset >= span.start {
                return span.display_at;
            } else {
                break;
            }
        }
        (full_offset - stripped).min(self.display_len)
    }

    /// Map a display offset to full space
    ///
    /// Every span removed at or before the target is re-inserted, so a caret at
    /// the start of a line that follows a marker sits after that marker.
    pub fn display_to_full(&self, display_offset: usize) -> usize {
        let display_offset = display_offset.min(self.display_len);
        let reinserted: usize = self
            .spans
            .iter()
            .take_while(|span| span.display_at <= display_offset)
            .map(StrippedSpan::len)
            .sum();
        display_offset + reinserted
    }

    /// Apply an edited display text to the full content this projection came from
    ///
    /// The edit is taken to be one contiguous region (common prefix and suffix
    /// of the two display texts). The new display text is kept exactly as
    /// given, even where it contains lines that look like markers: existing
    /// markers are carried through the edit instead of being re-parsed.
    ///
    /// A marker removed at the start of the edited region stays before it and
    /// one removed at its end stays with the text that follows. Markers strictly
    /// inside the region are dropped with it. A marker whose line got joined
    /// to the previous one moves to the start of that line.
    pub fn splice_display_edit(&self, full: &str, new_display: &str) -> (String, Projection) {
        let old_len = self.display_len;
        let new_len = char_len(new_display);

        let prefix = common_prefix_len(&self.display, new_display);
        let suffix = common_suffix_len(&self.display, new_display, old_len.min(new_len) - prefix);
        let edit_end = old_len - suffix;
        let inserted_end = new_len - suffix;

        let mut carried = Vec::with_capacity(self.spans.len());
        for (span, marker) in self.spans.iter().zip(&self.markers) {
            let display_at = if span.display_at <= prefix {
                span.display_at
            } else if span.display_at >= edit_end {
                span.display_at - edit_end + inserted_end
            } else {
                log::debug!("marker {}: {} removed with the edited text", marker.kind, marker.value);
                continue;
            };
            carried.push(CarriedMarker {
                display_at,
                text: slice_chars(full, span.start, span.end),
                marker,
            });
        }

        Self::assemble(new_display, carried)
    }

    /// Interleave carried marker lines into display text
    fn assemble(display: &str, carried: Vec<CarriedMarker<'_>>) -> (String, Projection) {
        let display_len = char_len(display);
        let marker_bytes: usize = carried.iter().map(|c| c.text.len() + 1).sum();

        let mut out = FullBuilder {
            full: String::with_capacity(display.len() + marker_bytes),
            len: 0,
            lines: 0,
            open_marker: false,
        };
        let mut spans: Vec<StrippedSpan> = Vec::with_capacity(carried.len());
        let mut markers: Vec<StructuralMarker> = Vec::with_capacity(carried.len());
        let mut taken = 0;

        for CarriedMarker { display_at, text, marker } in carried {
            let at = line_start_at_or_before(display, display_at.min(display_len)).max(taken);
            out.push_text(slice_chars(display, taken, at), &mut spans);
            taken = at;

            out.close_marker(&mut spans);
            let start = out.len;
            let line = out.lines;
            out.push_text(text, &mut spans);
            out.open_marker = !text.ends_with('\n');
            spans.push(StrippedSpan {
                start,
                end: out.len,
                display_at: at,
            });
            markers.push(StructuralMarker {
                line,
                kind: marker.kind.clone(),
                value: marker.value.clone(),
            });
        }
        out.push_text(slice_chars(display, taken, display_len), &mut spans);

        let projection = Projection {
            display: display.to_string(),
            spans,
            markers,
            full_len: out.len,
            display_len,
        };
        (out.full, projection)
    }
}

struct CarriedMarker<'a> {
    display_at: usize,
    text: &'a str,
    marker: &'a StructuralMarker,
}

struct FullBuilder {
    full: String,
    len: usize,
    lines: usize,
    /// The last thing written is a marker line without its newline
    open_marker: bool,
}

impl FullBuilder {
    fn push_text(&mut self, text: &str, spans: &mut [StrippedSpan]) {
        if text.is_empty() {
            return;
        }
        self.close_marker(spans);
        self.full.push_str(text);
        self.len += char_len(text);
        self.lines += text.matches('\n').count();
    }

    /// Terminate a marker that was last in the file but no longer is
    fn close_marker(&mut self, spans: &mut [StrippedSpan]) {
        if !self.open_marker {
            return;
        }
        self.open_marker = false;
        self.full.push('\n');
        self.len += 1;
        self.lines += 1;
        if let Some(span) = spans.last_mut() {
            span.end += 1;
        }
    }
}

fn slice_chars(s: &str, start: usize, end: usize) -> &str {
    &s[char_to_byte(s, start)..char_to_byte(s, end)]
}

/// Char offset of the start of the line containing `offset`
fn line_start_at_or_before(s: &str, offset: usize) -> usize {
    let byte = char_to_byte(s, offset);
    match s[..byte].rfind('\n') {
        Some(newline) => char_len(&s[..=newline]),
        None => 0,
    }
}

fn parse_marker(body: &str, line: usize) -> Result<Option<StructuralMarker>, ProjectionError> {
    if !body.starts_with("[[") {
        return Ok(None);
    }

    if let Some(caps) = MARKER.captures(body) {
        return Ok(Some(StructuralMarker {
            line,
            kind: caps[1].to_string(),
            value: caps[2].trim().to_string(),
        }));
    }

    if MARKER_OPEN.is_match(body) {
        if !body.ends_with("]]") {
            return Err(ProjectionError::UnterminatedMarker { line });
        }
        return Err(ProjectionError::EmptyMarkerKind { line });
    }

    // `[[free text]]` notes without a kind stay visible
    Ok(None)
}

/// Remove structural marker lines from full content
pub fn project(full: &str) -> String {
    Projection::build(full).into_display()
}

/// Translate a full-content offset into display space
pub fn map_full_to_display(display: &str, full: &str, full_offset: usize) -> usize {
    Projection::build(full)
        .full_to_display(full_offset)
        .min(char_len(display))
}

/// Translate a display offset into full-content space
pub fn map_display_to_full(display: &str, full: &str, display_offset: usize) -> usize {
    let display_offset = display_offset.min(char_len(display));
    Projection::build(full).display_to_full(display_offset)
}
