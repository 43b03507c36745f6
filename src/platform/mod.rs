//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time (leaderboard dates)
//! - Storage (LocalStorage on web, files natively)

use crate::persistence::KeyValueStore;
#[cfg(target_arch = "wasm32")]
use crate::persistence::{MemoryStore, StorageError};

/// Directory used by the native file store unless overridden
#[cfg(not(target_arch = "wasm32"))]
pub const DEFAULT_DATA_DIR: &str = ".pocket-arcade";

/// Environment variable overriding [`DEFAULT_DATA_DIR`]
#[cfg(not(target_arch = "wasm32"))]
pub const DATA_DIR_ENV: &str = "POCKET_ARCADE_DATA";

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    /// None when the page has no window or storage is disabled
    pub fn open() -> Option<Self> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .map(|storage| Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
fn js_error(err: wasm_bindgen::JsValue) -> StorageError {
    StorageError::Unavailable(format!("{:?}", err))
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(js_error)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage.set_item(key, value).map_err(js_error)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage.remove_item(key).map_err(js_error)
    }
}

/// LocalStorage when available, otherwise an in-memory store
#[cfg(target_arch = "wasm32")]
pub fn default_store() -> Box<dyn KeyValueStore> {
    match LocalStore::open() {
        Some(store) => Box::new(store),
        None => {
            log::warn!("LocalStorage unavailable, settings will not persist");
            Box::new(MemoryStore::new())
        }
    }
}

/// File store under `$POCKET_ARCADE_DATA` or `./.pocket-arcade`
#[cfg(not(target_arch = "wasm32"))]
pub fn default_store() -> Box<dyn KeyValueStore> {
    let dir = std::env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
    log::debug!("Using data directory {}", dir);
    Box::new(crate::persistence::FileStore::new(dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(now_ms() > 1_577_836_800_000.0);
    }

    #[test]
    fn test_clock_does_not_go_backwards() {
        let a = now_ms();
        let b = now_ms();
        assert!(b >= a);
    }
}
