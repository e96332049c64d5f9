//! Fire-control configuration (Resource)
//!
//! Загружается из JSON; отсутствующие поля берут default.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::collision_layers::{describe_mask, COLLISION_MASK_HITTABLE};

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireControlConfig {
    /// Слои, по которым бьёт hit-scan box
    pub hittable_mask: u32,

    /// Пустой clip + есть патроны в magazine → перезарядка стартует сама
    pub auto_reload_on_empty: bool,

    /// Последнее поле Hit payload (засчитывать попадание стрелку)
    pub credit_shooter: bool,
}

impl Default for FireControlConfig {
    fn default() -> Self {
        Self {
            hittable_mask: COLLISION_MASK_HITTABLE,
            auto_reload_on_empty: true,
            credit_shooter: true,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    EmptyHittableMask,
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Json(e) => write!(f, "invalid fire-control config: {}", e),
            ConfigError::EmptyHittableMask => write!(f, "hittable_mask must select at least one layer"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Json(e) => Some(e),
            ConfigError::EmptyHittableMask => None,
        }
    }
}

impl FireControlConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if config.hittable_mask == 0 {
            crate::logger::log_error("Config", "hittable_mask is empty, shots would hit nothing");
            return Err(ConfigError::EmptyHittableMask);
        }
        crate::logger::log_info(
            "Config",
            &format!(
                "Fire-control config loaded (hittable: {}, auto reload: {})",
                describe_mask(config.hittable_mask),
                config.auto_reload_on_empty
            ),
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FireControlConfig::default();
        assert_eq!(config.hittable_mask, (1 << 7) | (1 << 3) | (1 << 4));
        assert!(config.auto_reload_on_empty);
        assert!(config.credit_shooter);
    }

    #[test]
    fn test_partial_json() {
        let config = FireControlConfig::from_json(r#"{ "auto_reload_on_empty": false }"#).unwrap();
        assert!(!config.auto_reload_on_empty);
        assert_eq!(config.hittable_mask, COLLISION_MASK_HITTABLE);
    }

    #[test]
    fn test_rejects_empty_mask() {
        assert!(matches!(
            FireControlConfig::from_json(r#"{ "hittable_mask": 0 }"#),
            Err(ConfigError::EmptyHittableMask)
        ));
        assert!(matches!(
            FireControlConfig::from_json(r#"{ "hittable_mask": "x" }"#),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(FireControlConfig::from_json("42"), Err(ConfigError::Json(_))));
    }
}
