//! Browser-side geometry and clock

use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use crate::models::OverlayFrame;
use crate::sync::GeometrySource;
use crate::utils::scheduler::Millis;

/// Measures the editing surface element by id on every call
pub struct DomGeometry {
    element_id: String,
}

impl DomGeometry {
    pub fn new(element_id: impl Into<String>) -> Self {
        Self {
            element_id: element_id.into(),
        }
    }

    fn element(&self) -> Option<HtmlElement> {
        web_sys::window()?
            .document()?
            .get_element_by_id(&self.element_id)?
            .dyn_into::<HtmlElement>()
            .ok()
    }
}

impl GeometrySource for DomGeometry {
    fn measure(&self) -> Option<OverlayFrame> {
        let element = self.element()?;
        Some(OverlayFrame {
            left: element.offset_left() as f32,
            top: element.offset_top() as f32,
            width: element.client_width() as f32,
            height: element.client_height() as f32,
        })
    }
}

/// Monotonic host time in whole milliseconds
pub fn host_now() -> Millis {
    let now = web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now);
    now.max(0.0) as Millis
}

/// Epoch milliseconds at which `host_now` reads zero
pub fn time_origin() -> u64 {
    match web_sys::window().and_then(|w| w.performance()) {
        Some(performance) => performance.time_origin().max(0.0) as u64,
        // Date::now() is already wall clock; host_now counts from the epoch too
        None => 0,
    }
}
