use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_NEARBY_RADIUS_KM: f64 = 50.0;
pub const DEFAULT_NEARBY_LIMIT: usize = 10;
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("malformed config: {0}")]
    Malformed(String),
}

/// Tunables the shell may override. Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideConfig {
    pub nearby_radius_km: f64,
    pub nearby_limit: usize,
    pub min_password_length: usize,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            nearby_radius_km: DEFAULT_NEARBY_RADIUS_KM,
            nearby_limit: DEFAULT_NEARBY_LIMIT,
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
        }
    }
}

impl GuideConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.nearby_radius_km.is_finite() || self.nearby_radius_km <= 0.0 {
            return Err(ConfigError::Invalid(
                "nearby_radius_km must be a positive number".into(),
            ));
        }
        if self.nearby_limit == 0 {
            return Err(ConfigError::Invalid("nearby_limit must be > 0".into()));
        }
        if self.min_password_length == 0 {
            return Err(ConfigError::Invalid(
                "min_password_length must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GuideConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_password_length, 6);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = GuideConfig::from_json(r#"{"nearby_radius_km": 5.0}"#).unwrap();
        assert_eq!(config.nearby_radius_km, 5.0);
        assert_eq!(config.nearby_limit, DEFAULT_NEARBY_LIMIT);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            GuideConfig::from_json(r#"{"nearby_radius_km": -1.0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GuideConfig::from_json(r#"{"nearby_limit": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GuideConfig::from_json("not json"),
            Err(ConfigError::Malformed(_))
        ));
    }
}
