#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use travel_shared::capabilities::StorageErrorCode;
use travel_shared::{
    Category, Coordinates, Destination, DestinationId, InMemoryCatalog, KeyValueStore, KvError,
    MemoryStore, StorageKey,
};

/// Storage that can be told to fail writes.
#[derive(Default)]
pub struct FailableStorage {
    pub inner: MemoryStore,
    fail_writes: AtomicBool,
}

impl FailableStorage {
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), KvError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(KvError::storage(StorageErrorCode::Busy, "Injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FailableStorage {
    async fn get(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, KvError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &StorageKey, value: Vec<u8>) -> Result<(), KvError> {
        self.check()?;
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &StorageKey) -> Result<bool, KvError> {
        self.check()?;
        self.inner.delete(key).await
    }
}

pub fn id(s: &str) -> DestinationId {
    DestinationId::new(s).unwrap()
}

pub fn kathmandu() -> Coordinates {
    Coordinates::new(27.7172, 85.3240).unwrap()
}

fn destination(id_: &str, name: &str, category: Category, lat: f64, lon: f64) -> Destination {
    Destination {
        id: id(id_),
        name: name.into(),
        region: "Nepal".into(),
        category,
        coordinates: Coordinates::new(lat, lon).unwrap(),
        rating: 4.5,
        duration: "Half day".into(),
        price: "Free".into(),
        description: None,
    }
}

pub fn nepal_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new(vec![
        destination("dest001", "Pashupatinath", Category::Religious, 27.7104, 85.3488),
        destination("dest002", "Patan Durbar Square", Category::Cultural, 27.6727, 85.3253),
        destination("dest003", "Phewa Lake", Category::Nature, 28.2153, 83.9456),
        destination("dest004", "Chitwan National Park", Category::Wildlife, 27.5291, 84.3542),
        destination("dest005", "Bhaktapur", Category::Cultural, 27.6710, 85.4298),
    ])
}
