//! Browser `localStorage` behind `KeyValueStore`.
//!
//! Values are stored raw (not JSON-encoded) so the saved wallet address
//! stays readable by other pages on the same origin.

use ac_storage::KeyValueStore;
use anyhow::{Result, anyhow};
use gloo_storage::{LocalStorage, Storage};

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalKeyValueStore;

impl KeyValueStore for LocalKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        raw_get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| anyhow!("localStorage set {key}: {e:?}"))
    }

    fn remove(&self, key: &str) -> Result<()> {
        LocalStorage::raw()
            .remove_item(key)
            .map_err(|e| anyhow!("localStorage remove {key}: {e:?}"))
    }
}

pub fn raw_get(key: &str) -> Option<String> {
    LocalStorage::raw().get_item(key).ok().flatten()
}
