use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    NotDetermined,
    Granted,
    Denied,
}

impl PermissionState {
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Device location service. Denial is reported, never retried here.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn permission(&self) -> PermissionState;

    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// A fixed position, e.g. a manually dropped pin, or a denied permission.
#[derive(Debug, Clone, PartialEq)]
pub struct PinnedLocation {
    position: Option<Coordinates>,
}

impl PinnedLocation {
    #[must_use]
    pub const fn at(position: Coordinates) -> Self {
        Self {
            position: Some(position),
        }
    }

    #[must_use]
    pub const fn denied() -> Self {
        Self { position: None }
    }
}

#[async_trait]
impl LocationProvider for PinnedLocation {
    async fn permission(&self) -> PermissionState {
        if self.position.is_some() {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        }
    }

    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        self.position.ok_or(LocationError::PermissionDenied)
    }
}
