//! Cache chain configuration.

use super::decorators::{DEFAULT_LRU_CAPACITY, DEFAULT_PIN_COUNT};
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};

/// One decorator layer. Layers are listed innermost first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerConfig {
    Lru {
        #[serde(default = "default_capacity")]
        capacity: usize,
    },
    Weak {
        #[serde(default = "default_pin_count")]
        pin_count: usize,
    },
}

fn default_capacity() -> usize {
    DEFAULT_LRU_CAPACITY
}

fn default_pin_count() -> usize {
    DEFAULT_PIN_COUNT
}

fn default_id() -> String {
    "default".to_string()
}

fn default_layers() -> Vec<LayerConfig> {
    vec![LayerConfig::Lru {
        capacity: DEFAULT_LRU_CAPACITY,
    }]
}

fn default_logging() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_id")]
    pub id: String,
    #[serde(default = "default_layers")]
    pub layers: Vec<LayerConfig>,
    #[serde(default = "default_logging")]
    pub logging: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            id: default_id(),
            layers: default_layers(),
            logging: default_logging(),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_layers(mut self, layers: Vec<LayerConfig>) -> Self {
        self.layers = layers;
        self
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.logging = enabled;
        self
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "cache id must not be empty",
                ErrorContext::new()
                    .with_field_path("id")
                    .with_source("cache_config"),
            ));
        }
        let mut weak_layers = 0;
        for (i, layer) in self.layers.iter().enumerate() {
            match layer {
                LayerConfig::Lru { capacity: 0 } => {
                    return Err(Error::configuration_with_context(
                        "LRU capacity must be greater than zero",
                        ErrorContext::new()
                            .with_field_path(format!("layers[{}].capacity", i))
                            .with_source("cache_config"),
                    ));
                }
                LayerConfig::Weak { .. } => weak_layers += 1,
                LayerConfig::Lru { .. } => {}
            }
        }
        if weak_layers > 1 {
            return Err(Error::configuration_with_context(
                "at most one weak layer is allowed",
                ErrorContext::new()
                    .with_field_path("layers")
                    .with_details(format!("found {} weak layers", weak_layers))
                    .with_source("cache_config"),
            ));
        }
        Ok(())
    }
}
