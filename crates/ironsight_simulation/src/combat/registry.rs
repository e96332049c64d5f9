//! Weapon registry — authored definitions, загружаются один раз на старте
//!
//! JSON формат (список):
//! ```json
//! [{ "id": "m1911", "is_automatic": false, "base": { ... }, "upgraded": { ... } }]
//! ```
//! Профили валидируются при регистрации: сломанный профиль не доживает до
//! создания `WeaponInstance`.

use bevy::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::combat::weapon_stats::{ProfileError, WeaponProfiles, WeaponStatProfile};
use crate::combat::WeaponInstance;

/// Тип оружия: id + поведение + пара профилей
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponDefinition {
    id: String,
    is_automatic: bool,
    profiles: WeaponProfiles,
}

impl WeaponDefinition {
    pub fn new(id: impl Into<String>, is_automatic: bool, profiles: WeaponProfiles) -> Self {
        Self {
            id: id.into(),
            is_automatic,
            profiles,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_automatic(&self) -> bool {
        self.is_automatic
    }

    pub fn profiles(&self) -> &WeaponProfiles {
        &self.profiles
    }
}

/// Authored representation (до валидации)
#[derive(Debug, Clone, Deserialize)]
struct AuthoredWeapon {
    id: String,
    #[serde(default)]
    is_automatic: bool,
    base: WeaponStatProfile,
    upgraded: WeaponStatProfile,
}

#[derive(Debug)]
pub enum RegistryError {
    Json(serde_json::Error),
    InvalidProfile { weapon: String, source: ProfileError },
    DuplicateId(String),
}

impl From<serde_json::Error> for RegistryError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::Json(e) => write!(f, "invalid weapon definitions: {}", e),
            RegistryError::InvalidProfile { weapon, source } => {
                write!(f, "weapon '{}': {}", weapon, source)
            }
            RegistryError::DuplicateId(id) => write!(f, "weapon '{}' registered twice", id),
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::Json(e) => Some(e),
            RegistryError::InvalidProfile { source, .. } => Some(source),
            RegistryError::DuplicateId(_) => None,
        }
    }
}

/// Resource: все зарегистрированные типы оружия
///
/// Заменяет глобальный WeaponManager singleton — передаётся явно как `Res`.
#[derive(Resource, Debug, Default)]
pub struct WeaponRegistry {
    definitions: HashMap<String, Arc<WeaponDefinition>>,
}

impl WeaponRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: WeaponDefinition) -> Result<Arc<WeaponDefinition>, RegistryError> {
        if self.definitions.contains_key(definition.id()) {
            return Err(RegistryError::DuplicateId(definition.id().to_string()));
        }

        let definition = Arc::new(definition);
        self.definitions
            .insert(definition.id().to_string(), Arc::clone(&definition));

        crate::logger::log_info(
            "Config",
            &format!(
                "Registered weapon '{}' (base: {}, upgraded: {})",
                definition.id(),
                definition.profiles().base().name,
                definition.profiles().upgraded().name
            ),
        );

        Ok(definition)
    }

    /// Загрузить список определений из JSON
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let authored: Vec<AuthoredWeapon> = serde_json::from_str(json)?;
        let mut registry = Self::new();

        for entry in authored {
            let profiles = WeaponProfiles::new(entry.base, entry.upgraded).map_err(|source| {
                RegistryError::InvalidProfile {
                    weapon: entry.id.clone(),
                    source,
                }
            })?;
            registry.register(WeaponDefinition::new(entry.id, entry.is_automatic, profiles))?;
        }

        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<WeaponDefinition>> {
        self.definitions.get(id)
    }

    /// Новый instance для экипировки (полный clip + magazine)
    pub fn create_instance(&self, id: &str) -> Option<WeaponInstance> {
        self.get(id).map(|definition| WeaponInstance::new(Arc::clone(definition)))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
