use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::geo::Coordinates;

pub const MAX_ID_LENGTH: usize = 128;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
    #[error("{field} too long ({len} > {max})")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a catalog destination, e.g. `dest001`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct DestinationId(String);

impl DestinationId {
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty {
                field: "destination id",
            });
        }
        if trimmed.len() > MAX_ID_LENGTH {
            return Err(ValidationError::TooLong {
                field: "destination id",
                len: trimmed.len(),
                max: MAX_ID_LENGTH,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DestinationId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DestinationId> for String {
    fn from(id: DestinationId) -> Self {
        id.0
    }
}

impl fmt::Display for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The signed-in traveller. Persisted as `{id, name, email}`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: UserId::generate(),
            name: name.into(),
            email: email.into(),
        }
    }
}

// Keep the email address out of logs.
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email_present", &!self.email.is_empty())
            .finish()
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Cultural,
    Trekking,
    Adventure,
    Nature,
    Religious,
    Wildlife,
    #[serde(other)]
    Other,
}

impl Category {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cultural => "cultural",
            Self::Trekking => "trekking",
            Self::Adventure => "adventure",
            Self::Nature => "nature",
            Self::Religious => "religious",
            Self::Wildlife => "wildlife",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only reference data for a place worth visiting.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Destination {
    pub id: DestinationId,
    pub name: String,
    pub region: String,
    pub category: Category,
    pub coordinates: Coordinates,
    pub rating: f32,
    pub duration: String,
    pub price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_id_trims_and_validates() {
        assert_eq!(DestinationId::new("  dest001 ").unwrap().as_str(), "dest001");
        assert!(matches!(
            DestinationId::new("   "),
            Err(ValidationError::Empty { .. })
        ));
        assert!(matches!(
            DestinationId::new("x".repeat(MAX_ID_LENGTH + 1)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn destination_id_serializes_as_plain_string() {
        let id = DestinationId::new("dest001").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"dest001\"");

        let parsed: DestinationId = serde_json::from_str("\"dest002\"").unwrap();
        assert_eq!(parsed.as_str(), "dest002");

        assert!(serde_json::from_str::<DestinationId>("\"\"").is_err());
    }

    #[test]
    fn user_round_trips_with_expected_layout() {
        let user = User {
            id: UserId::new("u-1"),
            name: "Asha".into(),
            email: "asha@example.com".into(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "u-1", "name": "Asha", "email": "asha@example.com"})
        );
    }

    #[test]
    fn user_debug_is_redacted() {
        let user = User::new("Asha", "asha@example.com");
        let debug = format!("{user:?}");
        assert!(!debug.contains("asha@example.com"));
    }

    #[test]
    fn generated_user_ids_are_unique() {
        assert_ne!(UserId::generate(), UserId::generate());
    }

    #[test]
    fn unknown_category_falls_back_to_other() {
        let category: Category = serde_json::from_str("\"beach\"").unwrap();
        assert_eq!(category, Category::Other);
        let category: Category = serde_json::from_str("\"trekking\"").unwrap();
        assert_eq!(category, Category::Trekking);
    }
}
