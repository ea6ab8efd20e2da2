//! The `ScreenplayEditor` class exported to JavaScript
//!
//! Wraps a `SyncEditor` measured against a DOM element and clocked by
//! `performance.now()`. Every caret crossing this boundary is converted
//! between UTF-16 code units (JS) and chars (core).

use wasm_bindgen::prelude::*;

use crate::api::dom::{host_now, time_origin, DomGeometry};
use crate::api::helpers::{deserialize, offset_from_js, offset_to_js, serialize, to_js_error};
use crate::api::types::{outcome_name, JsEffects, JsRemoteApply, JsSave, RemoteStatus};
use crate::config::EditorConfig;
use crate::error::PersistError;
use crate::models::{RemoteCursor, SaveTicket, ScrollOffset};
use crate::sync::{PasteEvent, RemoteApply, SyncEditor, SyncSnapshot, TextChange};
use crate::text::TextRange;
use crate::{wasm_info, wasm_log, wasm_warn};

#[wasm_bindgen]
pub struct ScreenplayEditor {
    inner: SyncEditor,
}

#[wasm_bindgen]
impl ScreenplayEditor {
    /// Create an editor for the element with id `surface_id`
    ///
    /// `config` is a (possibly partial) camelCase `EditorConfig`, or
    /// `undefined` for the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, surface_id: String, initial_content: String) -> Result<ScreenplayEditor, JsValue> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            deserialize(config, "Invalid editor config")?
        };
        wasm_info!(
            "ScreenplayEditor created for #{} ({} chars, user {:?})",
            surface_id,
            initial_content.chars().count(),
            config.local_user_id
        );

        let inner = SyncEditor::with_monospace(config, Box::new(DomGeometry::new(surface_id)))
            .with_content(initial_content)
            .with_time_origin(time_origin());
        Ok(ScreenplayEditor { inner })
    }

    /// Returns true when an animation frame should be requested
    pub fn mount(&mut self) -> bool {
        self.inner.mount()
    }

    #[wasm_bindgen(js_name = onTextChange)]
    pub fn on_text_change(&mut self, new_content: String, cursor_offset: usize) -> bool {
        let cursor_offset = offset_from_js(&new_content, cursor_offset);
        self.inner.on_text_change(
            TextChange {
                new_content,
                cursor_offset,
            },
            host_now(),
        )
    }

    /// Returns the caret to set after the paste
    #[wasm_bindgen(js_name = onPaste)]
    pub fn on_paste(&mut self, clipboard_text: String, selection_start: usize, selection_end: usize) -> Option<usize> {
        let display = self.inner.display_content();
        let selection_range = TextRange::new(
            offset_from_js(display, selection_start),
            offset_from_js(display, selection_end),
        );

        let caret = self.inner.on_paste(
            PasteEvent {
                clipboard_text,
                selection_range,
            },
            host_now(),
        )?;
        Some(offset_to_js(self.inner.display_content(), caret))
    }

    #[wasm_bindgen(js_name = onSelectionChange)]
    pub fn on_selection_change(&mut self, cursor_offset: usize) {
        let offset = offset_from_js(self.inner.display_content(), cursor_offset);
        self.inner.on_selection_change(offset);
    }

    /// Returns true when the overlay should redraw now
    #[wasm_bindgen(js_name = onScroll)]
    pub fn on_scroll(&mut self, scroll_top: f32, scroll_left: f32) -> bool {
        self.inner
            .on_scroll(ScrollOffset::new(scroll_top, scroll_left), host_now())
    }

    #[wasm_bindgen(js_name = onResize)]
    pub fn on_resize(&mut self) {
        self.inner.on_resize(host_now());
    }

    /// Replace one auxiliary entity snapshot (characters, locations, ...)
    #[wasm_bindgen(js_name = setAuxiliary)]
    pub fn set_auxiliary(&mut self, kind: String, value: JsValue) -> Result<(), JsValue> {
        let value: serde_json::Value = deserialize(value, "Invalid auxiliary snapshot")?;
        self.inner.set_auxiliary(kind, value, host_now());
        Ok(())
    }

    /// Take a `{content, cursors}` snapshot from the collaboration feed
    #[wasm_bindgen(js_name = applyRemoteSync)]
    pub fn apply_remote_sync(&mut self, snapshot: JsValue) -> Result<JsValue, JsValue> {
        let mut snapshot: SyncSnapshot = deserialize(snapshot, "Invalid sync snapshot")?;
        for cursor in &mut snapshot.cursors {
            cursor_offsets_from_js(&snapshot.content, cursor);
        }

        let Some(applied) = self.inner.apply_remote_sync(snapshot, host_now()) else {
            return Ok(JsValue::NULL);
        };

        let result = match applied {
            RemoteApply::Applied(restoration) => JsRemoteApply {
                status: RemoteStatus::Applied,
                cursor_offset: restoration
                    .offset()
                    .map(|offset| offset_to_js(self.inner.display_content(), offset)),
            },
            RemoteApply::Identical => JsRemoteApply {
                status: RemoteStatus::Identical,
                cursor_offset: None,
            },
            RemoteApply::Deferred => JsRemoteApply {
                status: RemoteStatus::Deferred,
                cursor_offset: None,
            },
        };
        serialize(&result, "Failed to serialize sync result")
    }

    /// Drive timers; call on every scheduled wake-up
    pub fn tick(&mut self) -> Result<JsValue, JsValue> {
        let effects = self.inner.tick(host_now());
        let result = JsEffects {
            saves: effects.saves.into_iter().map(JsSave::from).collect(),
            frame_requested: effects.frame_requested,
            render: effects.render,
            notices: self.inner.take_notices(),
        };
        if !result.saves.is_empty() {
            wasm_log!("tick: {} save(s) due", result.saves.len());
        }
        serialize(&result, "Failed to serialize effects")
    }

    /// Returns true when the overlay should redraw
    #[wasm_bindgen(js_name = onAnimationFrame)]
    pub fn on_animation_frame(&mut self) -> bool {
        self.inner.on_animation_frame()
    }

    /// Manual save; returns the save to persist, or `null`
    #[wasm_bindgen(js_name = saveNow)]
    pub fn save_now(&mut self) -> Result<JsValue, JsValue> {
        match self.inner.save_now(host_now()) {
            Some(due) => serialize(&JsSave::from(due), "Failed to serialize save"),
            None => Ok(JsValue::NULL),
        }
    }

    /// Report the result of persisting a save
    ///
    /// `status` is the HTTP status of a rejection; without it a failure is
    /// treated as a network error. Returns the outcome name.
    #[wasm_bindgen(js_name = saveCompleted)]
    pub fn save_completed(&mut self, ticket: u32, ok: bool, message: Option<String>, status: Option<u16>) -> String {
        let result = if ok {
            Ok(())
        } else {
            let message = message.unwrap_or_else(|| "unknown error".to_string());
            Err(match status {
                Some(status) => PersistError::Rejected { status, message },
                None => PersistError::Network(message),
            })
        };

        let outcome = self.inner.complete_save(SaveTicket(u64::from(ticket)), result);
        let name = outcome_name(&outcome);
        if name == "failed" {
            wasm_warn!("save {} failed", ticket);
        }
        name.to_string()
    }

    #[wasm_bindgen(js_name = displayContent)]
    pub fn display_content(&self) -> String {
        self.inner.display_content().to_string()
    }

    #[wasm_bindgen(js_name = fullContent)]
    pub fn full_content(&self) -> String {
        self.inner.full_content().to_string()
    }

    #[wasm_bindgen(js_name = cursorOffset)]
    pub fn cursor_offset(&self) -> usize {
        offset_to_js(self.inner.display_content(), self.inner.cursor_offset())
    }

    #[wasm_bindgen(js_name = isDirty)]
    pub fn is_dirty(&self) -> bool {
        self.inner.is_dirty()
    }

    #[wasm_bindgen(js_name = visibleCursors)]
    pub fn visible_cursors(&self) -> Result<JsValue, JsValue> {
        serialize(&self.inner.visible_cursors(), "Failed to serialize cursors")
    }

    #[wasm_bindgen(js_name = overlayFrame)]
    pub fn overlay_frame(&self) -> Result<JsValue, JsValue> {
        serialize(&self.inner.overlay_frame(), "Failed to serialize overlay frame")
    }

    #[wasm_bindgen(js_name = takeNotices)]
    pub fn take_notices(&mut self) -> Result<JsValue, JsValue> {
        serialize(&self.inner.take_notices(), "Failed to serialize notices")
    }

    /// Milliseconds until `tick` next has work, or `undefined`
    #[wasm_bindgen(js_name = msUntilNextTick)]
    pub fn ms_until_next_tick(&self) -> Option<f64> {
        let deadline = self.inner.next_deadline()?;
        Some(deadline.saturating_sub(host_now()) as f64)
    }

    /// Structural markers of the current document as `[{line, kind, value}]`
    #[wasm_bindgen(js_name = structuralMarkers)]
    pub fn structural_markers(&self) -> Result<JsValue, JsValue> {
        serialize(&self.inner.document().markers(), "Failed to serialize markers")
    }

    pub fn dispose(&mut self) {
        self.inner.dispose();
    }
}

/// Parse a JSON config string, for hosts that keep config as text
#[wasm_bindgen(js_name = parseEditorConfig)]
pub fn parse_editor_config(json: &str) -> Result<JsValue, JsValue> {
    let config = EditorConfig::from_json(json).map_err(to_js_error)?;
    serialize(&config, "Failed to serialize config")
}

fn cursor_offsets_from_js(content: &str, cursor: &mut RemoteCursor) {
    cursor.offset = offset_from_js(content, cursor.offset);
    cursor.selection_start = cursor.selection_start.map(|o| offset_from_js(content, o));
    cursor.selection_end = cursor.selection_end.map(|o| offset_from_js(content, o));
}
