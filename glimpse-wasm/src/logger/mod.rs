use wasm_bindgen::JsValue;
use web_sys::console;

/// Console logging for the room engine; warnings and errors land on their
/// proper console levels so browser filtering works.
pub struct Logger;

impl Logger {
    pub fn info(msg: &str) {
        console::log_1(&format!("room engine: {}", msg).into());
    }

    pub fn warn(msg: &str) {
        console::warn_1(&format!("room engine: {}", msg).into());
    }

    pub fn error(err: &JsValue) {
        console::error_2(&"room engine:".into(), err);
    }
}
