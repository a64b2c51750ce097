use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Defaults applied to every builder created from this config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderConfig {
    pub collection: String,
    /// Server-side time limit for find and aggregate.
    #[serde(default)]
    pub max_time_ms: Option<u64>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl BuilderConfig {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
