//! Great-circle distance, distance labels and proximity ranking.

use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

use crate::model::Destination;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoordinateError {
    #[error("Latitude {0} is out of valid range [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("Longitude {0} is out of valid range [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("Coordinate value is not finite (NaN or Infinity)")]
    NonFinite,
}

/// Validated latitude/longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates")]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinates {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = CoordinateError;

    fn try_from(raw: RawCoordinates) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinateError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub const fn latitude(self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub const fn longitude(self) -> f64 {
        self.longitude
    }

    #[must_use]
    pub fn distance_km(self, other: Self) -> f64 {
        haversine_km(self, other)
    }
}

impl TryFrom<(f64, f64)> for Coordinates {
    type Error = CoordinateError;

    fn try_from((latitude, longitude): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(latitude, longitude)
    }
}

/// Haversine distance in kilometers on a sphere of radius [`EARTH_RADIUS_KM`].
#[must_use]
pub fn haversine_km(p1: Coordinates, p2: Coordinates) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let delta_lat = (p2.latitude - p1.latitude).to_radians();
    let delta_lon = (p2.longitude - p1.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);

    // Rounding can push `a` a hair outside [0, 1] for near-antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// `"450 m"` below one kilometer, `"12.3 km"` otherwise. Meters are rounded
/// first, so 999.6 m reads `"1.0 km"`; ties round away from zero.
#[must_use]
pub fn format_distance_km(km: f64) -> String {
    if !km.is_finite() || km < 0.0 {
        return "Unknown".to_string();
    }

    let meters = (km * 1000.0).round();
    if meters < 1000.0 {
        format!("{meters:.0} m")
    } else {
        format!("{:.1} km", (km * 10.0).round() / 10.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyDestination {
    pub destination: Destination,
    pub distance_km: f64,
}

impl NearbyDestination {
    #[must_use]
    pub fn distance_label(&self) -> String {
        format_distance_km(self.distance_km)
    }
}

/// Destinations within `radius_km` of `origin`, closest first, at most `limit`.
#[must_use]
pub fn rank_nearby(
    origin: Coordinates,
    destinations: &[Destination],
    radius_km: f64,
    limit: usize,
) -> Vec<NearbyDestination> {
    let mut nearby: Vec<NearbyDestination> = destinations
        .iter()
        .map(|destination| NearbyDestination {
            distance_km: haversine_km(origin, destination.coordinates),
            destination: destination.clone(),
        })
        .filter(|n| n.distance_km <= radius_km)
        .collect();

    nearby.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(Ordering::Equal)
    });
    nearby.truncate(limit);
    nearby
}

/// Point features for the map view, one per destination.
#[must_use]
pub fn to_feature_collection(nearby: &[NearbyDestination]) -> FeatureCollection {
    let features = nearby
        .iter()
        .map(|n| {
            let d = &n.destination;
            let mut properties = JsonObject::new();
            properties.insert("name".into(), d.name.clone().into());
            properties.insert("region".into(), d.region.clone().into());
            properties.insert("category".into(), d.category.as_str().into());
            properties.insert("distance_km".into(), n.distance_km.into());
            properties.insert("distance_label".into(), n.distance_label().into());

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![
                    d.coordinates.longitude(),
                    d.coordinates.latitude(),
                ]))),
                id: Some(Id::String(d.id.to_string())),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
