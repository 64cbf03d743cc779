//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time (run seeds)
//! - Default persistent storage

use crate::persistence::KeyValueStore;

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_millis() -> u64 {
    js_sys::Date::now() as u64
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Seed for a new run
pub fn run_seed() -> u64 {
    now_millis()
}

/// Persistent store for this platform, or an in-memory one if none is available
#[cfg(not(target_arch = "wasm32"))]
pub fn default_store() -> Box<dyn KeyValueStore> {
    match crate::persistence::FileStore::in_data_dir() {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("No persistent storage ({}), scores will not be kept", e);
            Box::new(crate::persistence::MemoryStore::new())
        }
    }
}

/// Persistent store for this platform, or an in-memory one if none is available
#[cfg(target_arch = "wasm32")]
pub fn default_store() -> Box<dyn KeyValueStore> {
    Box::new(crate::persistence::LocalStore)
}
