//! Screenplay editor WASM API
//!
//! The JavaScript-facing surface: one exported class wrapping `SyncEditor`,
//! plus the DOM geometry source and clock it runs on.
//!
//! # Module Structure
//!
//! - `helpers`: Console logging, JS marshalling, UTF-16 offset conversion
//! - `types`: Plain result objects handed back to JS
//! - `dom`: Element geometry and `performance.now()`
//! - `editor`: The `ScreenplayEditor` class

pub mod helpers;
pub mod types;
pub mod dom;
pub mod editor;

pub use editor::{parse_editor_config, ScreenplayEditor};
