//! Platform capabilities the shell provides to the core: durable key-value
//! storage and the device location service.

mod kv;
mod location;

#[cfg(all(feature = "sqlite", not(target_arch = "wasm32")))]
mod sqlite;

pub use self::kv::{
    load_json, save_json, KeyValueStore, KvError, MemoryStore, StorageErrorCode, StorageKey,
    MAX_KEY_LENGTH, MAX_VALUE_SIZE,
};
pub use self::location::{LocationError, LocationProvider, PermissionState, PinnedLocation};

#[cfg(all(feature = "sqlite", not(target_arch = "wasm32")))]
pub use self::sqlite::SqliteStore;
