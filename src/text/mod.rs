//! Text layer
//!
//! Pure text handling with no knowledge of collaboration or timing.
//!
//! ## Modules
//!
//! - `projection`: Full ⇄ display content mapping (structural markers)
//! - `cursor`: Char-offset ranges and selections
//! - `offsets`: Char/byte/UTF-16 offset conversions

pub mod cursor;
pub mod offsets;
pub mod projection;

// Re-exports for convenience
pub use cursor::{Selection, TextRange};
pub use projection::{
    map_display_to_full, map_full_to_display, project, Projection, StrippedSpan, StructuralMarker,
};
