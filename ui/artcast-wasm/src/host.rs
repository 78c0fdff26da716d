//! The injected `window.ethereum` wallet as `Provider` and `NotificationSource`.

use ac_api_types::{ChainId, WalletAddress};
use ac_chain_client::{NotificationSource, Provider, ProviderError, WalletNotification};
use async_trait::async_trait;
use js_sys::{Function, Object, Promise, Reflect};
use serde::Serialize;
use serde_json::{Value, json};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::dom;

/// Code used when the wallet throws something that is not an EIP-1193 error.
const INTERNAL_ERROR_CODE: i64 = -32603;

pub struct BrowserWallet {
    ethereum: Object,
}

impl BrowserWallet {
    /// `None` when no wallet extension injected `window.ethereum`.
    pub fn detect() -> Option<Rc<Self>> {
        let window = dom::window().ok()?;
        let ethereum = Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
        if ethereum.is_undefined() || ethereum.is_null() {
            return None;
        }
        let ethereum = ethereum.dyn_into::<Object>().ok()?;
        Some(Rc::new(Self { ethereum }))
    }

    fn method(&self, name: &str) -> Result<Function, ProviderError> {
        Reflect::get(&self.ethereum, &JsValue::from_str(name))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or_else(|| ProviderError::new(INTERNAL_ERROR_CODE, format!("wallet has no {name}()")))
    }

    fn on(&self, event: &str, handler: impl Fn(JsValue) + 'static) {
        let Ok(on) = self.method("on") else {
            tracing::warn!(event, "wallet does not support event subscriptions");
            return;
        };
        let cb = Closure::wrap(Box::new(handler) as Box<dyn Fn(JsValue)>);
        let _ = on.call2(&self.ethereum, &JsValue::from_str(event), cb.as_ref().unchecked_ref());
        cb.forget();
    }
}

fn to_js(value: &Value) -> Result<JsValue, ProviderError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| ProviderError::new(INTERNAL_ERROR_CODE, e.to_string()))
}

fn from_js(value: JsValue) -> Result<Value, ProviderError> {
    if value.is_undefined() {
        return Ok(Value::Null);
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| ProviderError::new(INTERNAL_ERROR_CODE, e.to_string()))
}

/// Read `{ code, message, data }` off a thrown wallet error.
pub fn provider_error(err: &JsValue) -> ProviderError {
    let field = |name: &str| Reflect::get(err, &JsValue::from_str(name)).ok();
    let code = field("code")
        .and_then(|c| c.as_f64())
        .map(|c| c as i64)
        .unwrap_or(INTERNAL_ERROR_CODE);
    let message = field("message")
        .and_then(|m| m.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| "unknown wallet error".to_owned());
    let data = field("data")
        .filter(|d| !d.is_undefined())
        .and_then(|d| serde_wasm_bindgen::from_value(d).ok());
    ProviderError { code, message, data }
}

#[async_trait(?Send)]
impl Provider for BrowserWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        tracing::debug!(method, "wallet request");
        let args = to_js(&json!({ "method": method, "params": params }))?;
        let request = self.method("request")?;
        let promise = request
            .call1(&self.ethereum, &args)
            .map_err(|e| provider_error(&e))?
            .dyn_into::<Promise>()
            .map_err(|_| ProviderError::new(INTERNAL_ERROR_CODE, "request() did not return a promise"))?;
        let result = JsFuture::from(promise).await.map_err(|e| provider_error(&e))?;
        from_js(result)
    }

    async fn pause(&self, millis: u32) {
        gloo_timers::future::TimeoutFuture::new(millis).await;
    }
}

impl NotificationSource for BrowserWallet {
    fn subscribe(&self, listener: Rc<dyn Fn(&WalletNotification)>) {
        let accounts_listener = Rc::clone(&listener);
        self.on("accountsChanged", move |value| {
            let accounts: Vec<String> = serde_wasm_bindgen::from_value(value).unwrap_or_default();
            let accounts = accounts.into_iter().map(WalletAddress).collect();
            accounts_listener(&WalletNotification::AccountsChanged(accounts));
        });

        self.on("chainChanged", move |value| {
            if let Some(chain) = value.as_string() {
                listener(&WalletNotification::ChainChanged(ChainId(chain)));
            }
        });
    }
}
