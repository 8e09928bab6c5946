//! Read-only destination lookup.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::model::{Category, Destination, DestinationId};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
    #[error("malformed catalog data: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait DestinationCatalog: Send + Sync {
    async fn all(&self) -> Result<Vec<Destination>, CatalogError>;

    async fn by_id(&self, id: &DestinationId) -> Result<Option<Destination>, CatalogError>;

    /// Matches in the order of `ids`. Unknown ids are skipped.
    async fn by_ids(&self, ids: &[DestinationId]) -> Result<Vec<Destination>, CatalogError> {
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            match self.by_id(id).await? {
                Some(destination) => found.push(destination),
                None => debug!(%id, "skipping unknown destination"),
            }
        }
        Ok(found)
    }

    /// Case-insensitive match on name or region.
    async fn search(&self, query: &str) -> Result<Vec<Destination>, CatalogError> {
        let needle = query.trim().to_lowercase();
        let all = self.all().await?;
        if needle.is_empty() {
            return Ok(all);
        }
        Ok(all
            .into_iter()
            .filter(|d| {
                d.name.to_lowercase().contains(&needle) || d.region.to_lowercase().contains(&needle)
            })
            .collect())
    }

    async fn by_category(&self, category: Category) -> Result<Vec<Destination>, CatalogError> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|d| d.category == category)
            .collect())
    }

    /// Highest rated first.
    async fn top_rated(&self, limit: usize) -> Result<Vec<Destination>, CatalogError> {
        let mut all = self.all().await?;
        all.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        all.truncate(limit);
        Ok(all)
    }
}

/// Catalog held in memory, in the order it was supplied.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    destinations: Vec<Destination>,
    index: HashMap<DestinationId, usize>,
}

impl InMemoryCatalog {
    /// Later entries with a repeated id are ignored.
    #[must_use]
    pub fn new(destinations: Vec<Destination>) -> Self {
        let mut kept = Vec::with_capacity(destinations.len());
        let mut index = HashMap::with_capacity(destinations.len());
        for destination in destinations {
            if index.contains_key(&destination.id) {
                continue;
            }
            index.insert(destination.id.clone(), kept.len());
            kept.push(destination);
        }
        Self {
            destinations: kept,
            index,
        }
    }

    /// Parses a JSON array of destinations.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let destinations: Vec<Destination> =
            serde_json::from_str(json).map_err(|e| CatalogError::Malformed(e.to_string()))?;
        Ok(Self::new(destinations))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }
}

#[async_trait]
impl DestinationCatalog for InMemoryCatalog {
    async fn all(&self) -> Result<Vec<Destination>, CatalogError> {
        Ok(self.destinations.clone())
    }

    async fn by_id(&self, id: &DestinationId) -> Result<Option<Destination>, CatalogError> {
        Ok(self
            .index
            .get(id)
            .map(|&position| self.destinations[position].clone()))
    }
}
