//! Credential lookup keyed by provider secret name (`POE_API_KEY`, `OPENAI_API_KEY`, ...)

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Source of API credentials
pub trait SecretStore: Send + Sync {
    /// Raw lookup; implementations may return empty or placeholder values
    fn lookup(&self, key: &str) -> Option<String>;

    /// Usable credential, or `None` when absent, blank or a `YOUR_..._HERE` placeholder
    fn get(&self, key: &str) -> Option<String> {
        self.lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty() && !is_placeholder(v))
    }
}

fn is_placeholder(value: &str) -> bool {
    value.starts_with("YOUR_") && value.ends_with("_HERE")
}

/// Process environment
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecrets;

impl SecretStore for EnvSecrets {
    fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Flat TOML file of `KEY = "value"` pairs
#[derive(Debug, Default, Clone)]
pub struct FileSecrets {
    values: HashMap<String, String>,
}

impl FileSecrets {
    /// Parse secrets from TOML text; non-string values are ignored
    pub fn from_toml(raw: &str) -> Result<Self> {
        let table: toml::Table =
            toml::from_str(raw).map_err(|e| Error::Config(format!("secrets file: {}", e)))?;

        let values = table
            .into_iter()
            .filter_map(|(key, value)| match value {
                toml::Value::String(s) => Some((key, s)),
                _ => None,
            })
            .collect();

        Ok(Self { values })
    }

    /// Load a secrets file; a missing file yields an empty store
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No secrets file at {}", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// Build from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl SecretStore for FileSecrets {
    fn lookup(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Secrets file first, then the environment
pub struct LayeredSecrets {
    layers: Vec<Box<dyn SecretStore>>,
}

impl LayeredSecrets {
    pub fn new(layers: Vec<Box<dyn SecretStore>>) -> Self {
        Self { layers }
    }

    /// File at `path` (if any) layered over the environment
    pub fn file_then_env(path: Option<&Path>) -> Result<Self> {
        let mut layers: Vec<Box<dyn SecretStore>> = Vec::new();
        if let Some(path) = path {
            layers.push(Box::new(FileSecrets::load(path)?));
        }
        layers.push(Box::new(EnvSecrets));
        Ok(Self::new(layers))
    }
}

impl SecretStore for LayeredSecrets {
    fn lookup(&self, key: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.get(key))
    }
}
