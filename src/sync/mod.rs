//! Synchronization components
//!
//! Each component owns one concern and its own timers; `SyncEditor` wires
//! them together around the document.

pub mod autosave;
pub mod cursor_preserver;
pub mod editor;
pub mod events;
pub mod overlay;
pub mod remote_cursors;

pub use autosave::{AutoSaveScheduler, PersistenceSink, SaveOutcome};
pub use cursor_preserver::{restore_offset, CursorPreserver, Restoration};
pub use editor::SyncEditor;
pub use events::{EditorEffects, Notice, NoticeKind, PasteEvent, RemoteApply, SyncSnapshot, TextChange};
pub use overlay::{GeometrySource, OverlayPositioner};
pub use remote_cursors::{
    ComputeState, ProjectedCursor, ProjectorTick, ProjectorTiming, RecomputeReason, RemoteCursorProjector,
    VisibleCursor,
};
