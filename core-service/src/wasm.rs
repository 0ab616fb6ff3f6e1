//! Browser entry points.
//!
//! The page owns the view state as a plain JS object and passes it into every
//! trigger; each call resolves to the next view state.
//!
//! ```js
//! import init, { RecentFiles } from "./pkg/core_service.js";
//!
//! await init();
//! RecentFiles.enableConsoleLogging("debug");
//! const demo = new RecentFiles(CLIENT_ID);
//! let view = demo.beginLoading({});
//! view = await demo.fetchRecentFiles(view);
//! ```

use std::sync::Arc;

use bridge_traits::time::LogLevel;
use bridge_wasm::{GoogleTokenClient, WasmHttpClient};
use core_runtime::config::DemoConfig;
use core_runtime::logging::{init_logging, LoggingConfig};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::service::RecentFilesService;
use crate::view::ViewState;

/// The demo page's handle on the recent-files workflow.
#[wasm_bindgen(js_name = RecentFiles)]
pub struct JsRecentFiles {
    service: RecentFilesService,
}

#[wasm_bindgen(js_class = RecentFiles)]
impl JsRecentFiles {
    /// Builds the service for `client_id` with the browser's `fetch` and the
    /// Google Identity Services token client.
    #[wasm_bindgen(constructor)]
    pub fn new(client_id: String) -> Result<JsRecentFiles, JsValue> {
        bridge_wasm::init_panic_hook();

        let http = WasmHttpClient::new().map_err(to_js_error)?;
        let builder = DemoConfig::builder()
            .client_id(client_id)
            .http_client(Arc::new(http))
            .identity_provider(Arc::new(GoogleTokenClient::new()));
        let service = RecentFilesService::bootstrap(builder).map_err(to_js_error)?;

        Ok(Self { service })
    }

    /// Routes `tracing` output to the browser console. `level` defaults to `info`.
    #[wasm_bindgen(js_name = enableConsoleLogging)]
    pub fn enable_console_logging(level: Option<String>) -> Result<(), JsValue> {
        let level = parse_level(level.as_deref().unwrap_or("info"));
        init_logging(LoggingConfig::default().with_level(level)).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = beginLoading)]
    pub fn begin_loading(&self, view: JsValue) -> Result<JsValue, JsValue> {
        to_js(&from_js(view)?.begin_loading())
    }

    /// Resolves to the next view state; never rejects for auth or Drive failures.
    #[wasm_bindgen(js_name = fetchRecentFiles)]
    pub async fn fetch_recent_files(&self, view: JsValue) -> Result<JsValue, JsValue> {
        let view = from_js(view)?;
        to_js(&self.service.fetch(&view).await)
    }

    pub async fn revoke(&self, view: JsValue) -> Result<JsValue, JsValue> {
        let view = from_js(view)?;
        to_js(&self.service.revoke(&view).await)
    }

    /// `"unauthorized"`, `"authorizing"` or `"authorized"`.
    #[wasm_bindgen(getter, js_name = authState)]
    pub fn auth_state(&self) -> String {
        self.service.auth_state().as_str().to_string()
    }
}

fn parse_level(level: &str) -> LogLevel {
    match level.to_ascii_lowercase().as_str() {
        "trace" => LogLevel::Trace,
        "debug" => LogLevel::Debug,
        "warn" => LogLevel::Warn,
        "error" => LogLevel::Error,
        _ => LogLevel::Info,
    }
}

fn from_js(value: JsValue) -> Result<ViewState, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(ViewState::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(JsValue::from)
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    // Plain objects rather than Maps, so the page can read fields directly.
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value.serialize(&serializer).map_err(JsValue::from)
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}
