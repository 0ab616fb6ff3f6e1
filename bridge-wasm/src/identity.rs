//! Google Identity Services token client.
//!
//! Implements [`IdentityProvider`] on top of `google.accounts.oauth2`:
//! `initTokenClient(...).requestAccessToken()` for the popup round-trip and
//! `revoke(token, done)` for revocation. Both report through callbacks, which
//! are bridged to futures with [`bridge_traits::callback::completion`].
//!
//! The GIS script (`https://accounts.google.com/gsi/client`) must be loaded
//! before the first request.

use async_trait::async_trait;
use bridge_traits::callback::completion;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::identity::{IdentityProvider, TokenGrant, TokenRequestError};
use js_sys::{Object, Reflect};
use serde::Deserialize;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;

use crate::error::js_error_message;

#[wasm_bindgen]
extern "C" {
    /// Handle returned by `initTokenClient`.
    type TokenClient;

    #[wasm_bindgen(js_namespace = ["google", "accounts", "oauth2"], js_name = initTokenClient, catch)]
    fn init_token_client(config: &JsValue) -> Result<TokenClient, JsValue>;

    #[wasm_bindgen(method, js_name = requestAccessToken, catch)]
    fn request_access_token(this: &TokenClient) -> Result<(), JsValue>;

    #[wasm_bindgen(js_namespace = ["google", "accounts", "oauth2"], js_name = revoke, catch)]
    fn revoke(token: &str, done: &js_sys::Function) -> Result<(), JsValue>;
}

/// `TokenResponse` passed to the token client's `callback`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<Lifetime>,
    scope: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// GIS has reported `expires_in` both as a number and as a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Lifetime {
    Seconds(f64),
    Text(String),
}

impl Lifetime {
    fn seconds(&self) -> Option<u64> {
        match self {
            Lifetime::Seconds(secs) if *secs >= 0.0 => Some(*secs as u64),
            Lifetime::Seconds(_) => None,
            Lifetime::Text(text) => text.trim().parse().ok(),
        }
    }
}

/// Popup failure passed to `error_callback` (`type` is e.g. `popup_closed`).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PopupError {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: Option<String>,
}

/// `RevocationResponse` passed to the `revoke` callback.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RevocationResponse {
    successful: bool,
    error: Option<String>,
    error_description: Option<String>,
}

fn classify_token_response(value: JsValue) -> Result<TokenGrant, TokenRequestError> {
    let response: TokenResponse = serde_wasm_bindgen::from_value(value).map_err(|e| {
        TokenRequestError::Provider {
            error: "invalid_response".to_string(),
            description: Some(e.to_string()),
        }
    })?;

    if let Some(error) = response.error {
        return Err(TokenRequestError::from_oauth_error(
            error,
            response.error_description,
        ));
    }

    match (
        response.access_token,
        response.expires_in.as_ref().and_then(Lifetime::seconds),
    ) {
        (Some(access_token), Some(expires_in)) => Ok(TokenGrant {
            access_token,
            expires_in,
            scope: response.scope.unwrap_or_default(),
        }),
        _ => Err(TokenRequestError::Provider {
            error: "invalid_response".to_string(),
            description: Some("token response lacked access_token or expires_in".to_string()),
        }),
    }
}

fn classify_popup_error(value: JsValue) -> TokenRequestError {
    let popup: PopupError = serde_wasm_bindgen::from_value(value).unwrap_or_default();
    TokenRequestError::from_oauth_error(
        popup.kind.unwrap_or_else(|| "unknown".to_string()),
        popup.message,
    )
}

fn set(target: &Object, key: &str, value: &JsValue) -> Result<(), TokenRequestError> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|err| TokenRequestError::PopupFailed(js_error_message(&err)))
}

/// Google Identity Services implementation of [`IdentityProvider`].
///
/// Uses the GIS default consent prompt.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoogleTokenClient;

impl GoogleTokenClient {
    /// Token client bound to the page's `google.accounts.oauth2`.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl IdentityProvider for GoogleTokenClient {
    async fn request_token(
        &self,
        client_id: &str,
        scope: &str,
    ) -> Result<TokenGrant, TokenRequestError> {
        let (completer, pending) = completion::<Result<TokenGrant, TokenRequestError>>();

        let on_token = {
            let completer = completer.clone();
            Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
                completer.complete(classify_token_response(value));
            })
        };
        let on_error = {
            let completer = completer.clone();
            Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
                completer.complete(Err(classify_popup_error(value)));
            })
        };
        drop(completer);

        let config = Object::new();
        set(&config, "client_id", &JsValue::from_str(client_id))?;
        set(&config, "scope", &JsValue::from_str(scope))?;
        set(&config, "callback", on_token.as_ref())?;
        set(&config, "error_callback", on_error.as_ref())?;

        let client = init_token_client(&config)
            .map_err(|err| TokenRequestError::PopupFailed(js_error_message(&err)))?;
        client
            .request_access_token()
            .map_err(|err| TokenRequestError::PopupFailed(js_error_message(&err)))?;
        debug!("Token popup requested");

        // The closures must outlive the popup; they are released once it reports.
        let outcome = pending.await;
        drop((on_token, on_error));

        outcome.unwrap_or(Err(TokenRequestError::UserCancelled))
    }

    async fn revoke_token(&self, token: &str) -> BridgeResult<()> {
        let (completer, pending) = completion::<RevocationResponse>();

        let on_done = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            completer.complete(serde_wasm_bindgen::from_value(value).unwrap_or_default());
        });

        revoke(token, on_done.as_ref().unchecked_ref()).map_err(|err| {
            BridgeError::OperationFailed(format!("revoke: {}", js_error_message(&err)))
        })?;

        let response = pending.await;
        drop(on_done);

        let response = response.map_err(|e| BridgeError::OperationFailed(e.to_string()))?;
        if response.successful {
            Ok(())
        } else {
            let detail = response
                .error_description
                .or(response.error)
                .unwrap_or_else(|| "provider did not confirm revocation".to_string());
            warn!(%detail, "Revocation not confirmed");
            Err(BridgeError::OperationFailed(detail))
        }
    }
}
