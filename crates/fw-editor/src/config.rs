//! Session configuration.

use crate::mode::EditorMode;
use serde::{Deserialize, Serialize};

/// Options an editor session starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// Mode the session opens in.
    pub mode: EditorMode,
    /// Attribute name carrying the node identity on rendered elements.
    pub data_attribute: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: EditorMode::Edit,
            data_attribute: "nd-id".to_string(),
        }
    }
}

impl SessionConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| format!("invalid session config: {e}"))?;
        if config.data_attribute.trim().is_empty() {
            return Err("invalid session config: dataAttribute must not be empty".to_string());
        }
        Ok(config)
    }
}
