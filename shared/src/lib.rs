// Shared core of the travel guide app: session, favorites, destination
// lookup and geo ranking. Native shells own rendering and navigation.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod app;
pub mod capabilities;
pub mod catalog;
pub mod config;
pub mod favorites;
pub mod geo;
pub mod model;
pub mod session;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use app::{Guide, GuideView, RestoreReport};
pub use capabilities::{
    KeyValueStore, KvError, LocationError, LocationProvider, MemoryStore, PermissionState,
    PinnedLocation, StorageKey,
};
#[cfg(all(feature = "sqlite", not(target_arch = "wasm32")))]
pub use capabilities::SqliteStore;
pub use catalog::{CatalogError, DestinationCatalog, InMemoryCatalog};
pub use config::{ConfigError, GuideConfig};
pub use favorites::{FavoriteSet, FavoritesError, FavoritesStore};
pub use geo::{
    format_distance_km, haversine_km, rank_nearby, to_feature_collection, CoordinateError,
    Coordinates, NearbyDestination, EARTH_RADIUS_KM,
};
pub use model::{Category, Destination, DestinationId, User, UserId, ValidationError};
pub use session::{SessionError, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Transient,
    Permanent,
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    Storage,
    StorageFull,
    Serialization,
    Deserialization,
    CatalogUnavailable,
    Location,
    LocationPermissionDenied,
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Storage => "STORAGE_ERROR",
            Self::StorageFull => "STORAGE_FULL",
            Self::Serialization => "SERIALIZATION_ERROR",
            Self::Deserialization => "DESERIALIZATION_ERROR",
            Self::CatalogUnavailable => "CATALOG_UNAVAILABLE",
            Self::Location => "LOCATION_ERROR",
            Self::LocationPermissionDenied => "LOCATION_PERMISSION_DENIED",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    #[must_use]
    pub const fn default_severity(self) -> ErrorSeverity {
        match self {
            Self::Storage | Self::CatalogUnavailable | Self::Location => ErrorSeverity::Transient,

            Self::Serialization | Self::Internal => ErrorSeverity::Fatal,

            Self::Validation
            | Self::StorageFull
            | Self::Deserialization
            | Self::LocationPermissionDenied => ErrorSeverity::Permanent,
        }
    }

    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Storage | Self::CatalogUnavailable | Self::Location
        )
    }
}

/// Error surfaced to the shell. Module errors convert into it with `?`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub severity: ErrorSeverity,
    pub message: String,
    pub internal_message: Option<String>,
    pub context: HashMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            internal_message: None,
            context: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable() && matches!(self.severity, ErrorSeverity::Transient)
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Validation => self.message.clone(),
            ErrorKind::Storage => {
                "Unable to save your changes on this device. Please try again.".into()
            }
            ErrorKind::StorageFull => {
                "Unable to save data locally. Please free up some storage space.".into()
            }
            ErrorKind::Serialization | ErrorKind::Deserialization => {
                "Some saved data could not be read and was reset.".into()
            }
            ErrorKind::CatalogUnavailable => {
                "Destinations are unavailable right now. Please try again later.".into()
            }
            ErrorKind::Location => {
                "Unable to determine your location. Please check your GPS settings.".into()
            }
            ErrorKind::LocationPermissionDenied => {
                "Location access is required to show nearby places. Please enable location permissions in Settings."
                    .into()
            }
            ErrorKind::Internal => {
                "An unexpected error occurred. Please try again or contact support.".into()
            }
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<KvError> for AppError {
    fn from(e: KvError) -> Self {
        match &e {
            KvError::InvalidKey { key, .. } => {
                AppError::new(ErrorKind::Internal, e.to_string()).with_context("key", key.clone())
            }
            KvError::ValueTooLarge { .. } => AppError::new(ErrorKind::StorageFull, e.to_string()),
            KvError::Storage { retryable, .. } => {
                let error = AppError::new(ErrorKind::Storage, e.to_string());
                if *retryable {
                    error
                } else {
                    error.with_severity(ErrorSeverity::Permanent)
                }
            }
            KvError::Serialization { .. } => AppError::new(ErrorKind::Serialization, e.to_string()),
            KvError::Deserialization { key, .. } => {
                AppError::new(ErrorKind::Deserialization, e.to_string())
                    .with_context("key", key.clone())
            }
        }
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Storage(kv) => kv.into(),
            other => AppError::new(ErrorKind::Validation, other.to_string()),
        }
    }
}

impl From<FavoritesError> for AppError {
    fn from(e: FavoritesError) -> Self {
        match e {
            FavoritesError::Storage(kv) => kv.into(),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match &e {
            CatalogError::Unavailable(_) => {
                AppError::new(ErrorKind::CatalogUnavailable, e.to_string())
            }
            CatalogError::Malformed(_) => AppError::new(ErrorKind::Deserialization, e.to_string()),
        }
    }
}

impl From<LocationError> for AppError {
    fn from(e: LocationError) -> Self {
        let kind = match &e {
            LocationError::PermissionDenied => ErrorKind::LocationPermissionDenied,
            LocationError::Unavailable(_) => ErrorKind::Location,
        };
        AppError::new(kind, e.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::new(ErrorKind::Validation, e.to_string())
    }
}

impl From<CoordinateError> for AppError {
    fn from(e: CoordinateError) -> Self {
        AppError::new(ErrorKind::Validation, e.to_string())
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::new(ErrorKind::Validation, e.to_string())
    }
}

#[must_use]
pub fn get_current_time_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
