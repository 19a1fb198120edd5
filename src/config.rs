//! Rule configuration loading.
//!
//! Rule files are YAML (JSON works too, being a YAML subset for our purposes):
//!
//! ```yaml
//! rules:
//! - name: scaling
//!   routers:
//!   - name: slack
//!   vars:
//!   - name: type
//!     jsonpath: $..Type
//!   template: This {type} just came in
//! ```
//!
//! Loading only checks the outer `rules:` list. Each definition is kept as raw
//! JSON and validated by `Rule::from_value` when the engine compiles it.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    pub rules: Vec<Value>,
}

impl RulesConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Read a rule file; `.json` files are parsed as JSON, anything else as YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&text)?,
            _ => Self::from_yaml_str(&text)?,
        };
        tracing::debug!(path = %path.display(), rules = config.rules.len(), "loaded rule file");
        Ok(config)
    }
}
