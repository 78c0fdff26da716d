//! Data-network client backed by the Arkiv JS SDK.
//!
//! `index.html` exposes a small bridge on `window.arkiv` built from the SDK's
//! wallet client (`createEntity`, `queryEntities`, `updateEntity`), each
//! returning a promise and exchanging JSON payloads rather than byte arrays.

use ac_storage::{Attribute, EntityReceipt, EntityStore, EntityUpdate, NewEntity, StoredEntity};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use js_sys::{Function, Object, Promise, Reflect};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::dom;
use crate::host::provider_error;

pub struct ArkivStore {
    bridge: Object,
}

impl ArkivStore {
    pub fn detect() -> Option<Rc<Self>> {
        let window = dom::window().ok()?;
        let bridge = Reflect::get(&window, &JsValue::from_str("arkiv")).ok()?;
        if bridge.is_undefined() || bridge.is_null() {
            return None;
        }
        Some(Rc::new(Self {
            bridge: bridge.dyn_into::<Object>().ok()?,
        }))
    }

    async fn invoke<A: Serialize, R: DeserializeOwned>(&self, name: &str, arg: &A) -> Result<R> {
        let func = Reflect::get(&self.bridge, &JsValue::from_str(name))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or_else(|| anyhow!("arkiv bridge has no {name}()"))?;
        let arg = arg
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| anyhow!("arkiv {name} arguments: {e}"))?;
        let promise = func
            .call1(&self.bridge, &arg)
            .map_err(|e| anyhow!(provider_error(&e).message))?
            .dyn_into::<Promise>()
            .map_err(|_| anyhow!("arkiv {name} did not return a promise"))?;
        let result = JsFuture::from(promise)
            .await
            .map_err(|e| anyhow!(provider_error(&e).message))
            .with_context(|| format!("arkiv {name}"))?;
        serde_wasm_bindgen::from_value(result).map_err(|e| anyhow!("arkiv {name} result: {e}"))
    }
}

#[async_trait(?Send)]
impl EntityStore for ArkivStore {
    async fn create_entity(&self, entity: NewEntity) -> Result<EntityReceipt> {
        self.invoke("createEntity", &entity).await
    }

    async fn query_entities(&self, filter: &[Attribute]) -> Result<Vec<StoredEntity>> {
        self.invoke("queryEntities", &filter).await
    }

    async fn update_entity(&self, update: EntityUpdate) -> Result<EntityReceipt> {
        self.invoke("updateEntity", &update).await
    }
}
