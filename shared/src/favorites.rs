//! Favorited destinations, mirrored to the `favorites` storage key as a JSON
//! array of ids in the order they were added.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

use crate::capabilities::{load_json, save_json, KeyValueStore, KvError, StorageKey};
use crate::model::DestinationId;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FavoritesError {
    #[error("favorites storage failed: {0}")]
    Storage(#[from] KvError),
}

/// Insertion-ordered set of destination ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<DestinationId>")]
pub struct FavoriteSet {
    order: Vec<DestinationId>,
    members: HashSet<DestinationId>,
}

impl FavoriteSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the id was already present.
    pub fn insert(&mut self, id: DestinationId) -> bool {
        if !self.members.insert(id.clone()) {
            return false;
        }
        self.order.push(id);
        true
    }

    pub fn remove(&mut self, id: &DestinationId) -> bool {
        if !self.members.remove(id) {
            return false;
        }
        self.order.retain(|existing| existing != id);
        true
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    #[must_use]
    pub fn contains(&self, id: &DestinationId) -> bool {
        self.members.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DestinationId> {
        self.order.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[DestinationId] {
        &self.order
    }
}

/// Stored lists are read leniently: entries that are not valid ids are
/// dropped and duplicates keep their first occurrence.
impl From<Vec<String>> for FavoriteSet {
    fn from(raw: Vec<String>) -> Self {
        let mut set = Self::new();
        for entry in raw {
            match DestinationId::new(entry.as_str()) {
                Ok(id) => {
                    set.insert(id);
                }
                Err(e) => warn!(entry = %entry, error = %e, "dropping invalid favorite"),
            }
        }
        set
    }
}

impl From<FavoriteSet> for Vec<DestinationId> {
    fn from(set: FavoriteSet) -> Self {
        set.order
    }
}

/// Owns the favorites list. Each mutation updates memory first, then writes
/// the full list while still holding the lock, so writes land in mutation
/// order. On a failed write the in-memory list is kept; call
/// [`FavoritesStore::persist`] to retry.
pub struct FavoritesStore<S: KeyValueStore> {
    storage: Arc<S>,
    state: RwLock<FavoriteSet>,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            state: RwLock::new(FavoriteSet::new()),
        }
    }

    /// Loads the persisted list. Absent or unreadable data starts empty.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<usize, FavoritesError> {
        let mut state = self.state.write().await;
        match load_json::<S, FavoriteSet>(self.storage.as_ref(), &StorageKey::FAVORITES).await {
            Ok(Some(restored)) => {
                *state = restored;
                info!(count = state.len(), "favorites restored");
                Ok(state.len())
            }
            Ok(None) => {
                state.clear();
                Ok(0)
            }
            Err(e) => {
                warn!(error = %e, "failed to restore favorites");
                state.clear();
                Err(e.into())
            }
        }
    }

    /// Returns `false` without writing when `id` is already a favorite.
    #[instrument(skip(self))]
    pub async fn add(&self, id: DestinationId) -> Result<bool, FavoritesError> {
        let mut state = self.state.write().await;
        if !state.insert(id) {
            debug!("already a favorite");
            return Ok(false);
        }
        self.write(&state).await?;
        Ok(true)
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, id: &DestinationId) -> Result<bool, FavoritesError> {
        let mut state = self.state.write().await;
        if !state.remove(id) {
            return Ok(false);
        }
        self.write(&state).await?;
        Ok(true)
    }

    /// Returns whether `id` is a favorite afterwards.
    #[instrument(skip(self))]
    pub async fn toggle(&self, id: DestinationId) -> Result<bool, FavoritesError> {
        let mut state = self.state.write().await;
        let now_favorite = if state.contains(&id) {
            state.remove(&id);
            false
        } else {
            state.insert(id);
            true
        };
        self.write(&state).await?;
        Ok(now_favorite)
    }

    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), FavoritesError> {
        let mut state = self.state.write().await;
        state.clear();
        self.write(&state).await
    }

    pub async fn contains(&self, id: &DestinationId) -> bool {
        self.state.read().await.contains(id)
    }

    pub async fn ids(&self) -> Vec<DestinationId> {
        self.state.read().await.as_slice().to_vec()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.is_empty()
    }

    /// Rewrites the full in-memory list to storage.
    #[instrument(skip(self))]
    pub async fn persist(&self) -> Result<(), FavoritesError> {
        let state = self.state.read().await;
        self.write(&state).await
    }

    async fn write(&self, state: &FavoriteSet) -> Result<(), FavoritesError> {
        if let Err(e) = save_json(self.storage.as_ref(), &StorageKey::FAVORITES, state).await {
            error!(count = state.len(), error = %e, "favorites not persisted");
            return Err(e.into());
        }
        debug!(count = state.len(), "favorites persisted");
        Ok(())
    }
}
