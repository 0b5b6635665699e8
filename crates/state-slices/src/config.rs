//! Slice configuration
//!
//! A slice's name and initial state can be declared in a TOML or JSON file
//! instead of in code. Missing `initial_state` falls back to `S::default()`.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::builder::SliceBuilder;
use crate::error::{Result, SliceError};
use crate::state::SliceState;

#[derive(Debug, Clone, Deserialize)]
pub struct SliceConfig<S> {
    /// Slice name, also the action type prefix
    pub name: String,

    #[serde(default)]
    pub initial_state: S,
}

impl<S: DeserializeOwned + Default> SliceConfig<S> {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load from a `.toml` or `.json` file, chosen by extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => {
                return Err(SliceError::UnsupportedConfigFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        }?;

        log::info!("Loaded slice config {} from {}", config.name, path.display());
        Ok(config)
    }
}

impl<S: SliceState> SliceConfig<S> {
    /// Validate the name and start building the slice
    pub fn into_builder(self) -> Result<SliceBuilder<S>> {
        SliceBuilder::new(self.name, self.initial_state)
    }
}
