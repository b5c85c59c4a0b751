use std::{
    fs,
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::capabilities::{KvError, StorageKey};
use crate::model::CityId;
use crate::{CityError, DEFAULT_STORAGE_KEY};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid storage key: {0}")]
    StorageKey(#[from] KvError),
}

/// What to do when the stored collection cannot be read, parsed or written.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageFailurePolicy {
    /// Log the failure and carry on with whatever is in memory (an empty
    /// collection when loading).
    #[default]
    SilentEmpty,
    /// Log the failure and also write a message into the state's error field.
    Propagate,
}

/// How identifiers are assigned to newly created cities.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdStrategy {
    /// Random v4 UUID.
    #[default]
    Uuid,
    /// Milliseconds since the Unix epoch. Two cities created within the same
    /// millisecond collide. Needs a system clock, so not for wasm shells.
    Timestamp,
}

impl IdStrategy {
    pub fn generate(self) -> Result<CityId, CityError> {
        match self {
            Self::Uuid => Ok(CityId(Uuid::new_v4().to_string())),
            Self::Timestamp => {
                let elapsed = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map_err(|e| CityError::Clock(e.to_string()))?;
                Ok(CityId(elapsed.as_millis().to_string()))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub storage_key: String,
    pub storage_failure_policy: StorageFailurePolicy,
    pub id_strategy: IdStrategy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.into(),
            storage_failure_policy: StorageFailurePolicy::default(),
            id_strategy: IdStrategy::default(),
        }
    }
}

impl Settings {
    /// Parses settings from TOML. Missing fields keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        StorageKey::parse(&self.storage_key)?;
        Ok(())
    }
}
