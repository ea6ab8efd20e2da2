//! Models module for the screenplay sync core
//!
//! Plain data shared between the synchronization components. Nothing in
//! here schedules work or talks to the host.

pub mod cursor;
pub mod document;
pub mod geometry;
pub mod save;

// Re-export commonly used types
pub use cursor::{palette_color, CursorMode, CursorState, RemoteCursor};
pub use document::Document;
pub use geometry::{OverlayFrame, PixelPosition, Point, ScrollOffset};
pub use save::{AuxiliarySnapshot, DueSave, SavePayload, SaveRequest, SaveTicket};
