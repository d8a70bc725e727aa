//! Key/value configuration providers

use crate::error::{ConfigError, Result};
use serde_yaml::Value;
use std::collections::HashMap;
use std::path::Path;

/// Environment variable prefix read by [`EnvConfig`]
pub const ENV_PREFIX: &str = "DRIFTCHECK_";

/// Key/value lookup capability
///
/// Only `get` has to be implemented; the remaining methods are built on it.
pub trait ConfigProvider: Send + Sync {
    /// Look up a raw value
    fn get(&self, key: &str) -> Option<String>;

    fn get_with_default(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn get_required(&self, key: &str) -> Result<String> {
        self.get(key)
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }

    /// Parse a value with `FromStr`, `None` when the key is absent
    fn get_parsed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
        Self: Sized,
    {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    /// Boolean lookup accepting true/false, yes/no, on/off and 1/0
    fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Some(true)),
            "false" | "no" | "off" | "0" => Ok(Some(false)),
            other => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("expected a boolean, got '{}'", other),
            }),
        }
    }
}

/// Values loaded from a flat YAML mapping
#[derive(Debug, Clone, Default)]
pub struct FileConfig {
    values: HashMap<String, String>,
}

impl FileConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let value: Value = serde_yaml::from_str(&content)?;

        let config = Self::from_value(value)
            .ok_or_else(|| ConfigError::NotAMapping(path.to_path_buf()))?;
        tracing::debug!(
            "Loaded {} config values from {}",
            config.values.len(),
            path.display()
        );
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(content)?;
        Self::from_value(value).ok_or_else(|| ConfigError::NotAMapping("<inline>".into()))
    }

    fn from_value(value: Value) -> Option<Self> {
        let mapping = match value {
            Value::Mapping(mapping) => mapping,
            // An empty file parses as null
            Value::Null => return Some(Self::new()),
            _ => return None,
        };

        let mut values = HashMap::new();
        for (key, value) in mapping {
            let Some(key) = key.as_str() else {
                continue;
            };
            match scalar_to_string(&value) {
                Some(s) => {
                    values.insert(key.to_string(), s);
                }
                None => tracing::debug!("Ignoring non-scalar config key: {}", key),
            }
        }
        Some(Self { values })
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl ConfigProvider for FileConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Values read from `DRIFTCHECK_<KEY>` environment variables
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConfig;

impl EnvConfig {
    pub fn var_name(key: &str) -> String {
        format!("{}{}", ENV_PREFIX, key.to_ascii_uppercase().replace('-', "_"))
    }
}

impl ConfigProvider for EnvConfig {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(Self::var_name(key))
            .ok()
            .filter(|v| !v.is_empty())
    }
}

/// Providers consulted in order; the first one holding a key wins
#[derive(Default)]
pub struct LayeredConfig {
    layers: Vec<Box<dyn ConfigProvider>>,
}

impl LayeredConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, provider: impl ConfigProvider + 'static) -> Self {
        self.layers.push(Box::new(provider));
        self
    }
}

impl ConfigProvider for LayeredConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.get(key))
    }
}
