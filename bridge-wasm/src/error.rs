//! Conversion of JavaScript exceptions into bridge errors

use bridge_traits::error::BridgeError;
use wasm_bindgen::{JsCast, JsValue};

/// Best-effort human-readable text for a thrown JavaScript value.
pub fn js_error_message(err: &JsValue) -> String {
    if let Some(text) = err.as_string() {
        text
    } else if let Some(js_err) = err.dyn_ref::<js_sys::Error>() {
        js_err.message().into()
    } else {
        format!("{err:?}")
    }
}

/// A JavaScript call failed before anything reached the network.
pub(crate) fn operation_failed(context: &str, err: JsValue) -> BridgeError {
    BridgeError::OperationFailed(format!("{context}: {}", js_error_message(&err)))
}

/// `fetch` rejected: DNS, CORS, offline, aborted.
pub(crate) fn network_failed(context: &str, err: JsValue) -> BridgeError {
    BridgeError::Network(format!("{context}: {}", js_error_message(&err)))
}
