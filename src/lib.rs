//! Screenplay Editor Sync WASM Module
//!
//! Keeps one screenplay buffer consistent across local typing, remote
//! collaborator snapshots and debounced persistence, and projects other
//! users' cursors onto the text.

pub mod api;
pub mod config;
pub mod error;
pub mod layout;
pub mod models;
pub mod sync;
pub mod text;
pub mod utils;

// Re-export commonly used types
pub use config::{EditorConfig, RemoteContentPolicy};
pub use error::{PersistError, ProjectionError, SyncError};
pub use layout::{FontMetrics, MonospaceLayout, TextLayoutOracle};
pub use models::*;
pub use sync::*;
pub use text::{Projection, StructuralMarker, TextRange};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    {
        if console_log::init_with_level(log::Level::Debug).is_err() {
            crate::wasm_warn!("logger already initialized");
        }
    }

    log::info!("Screenplay sync WASM module initialized");
}
