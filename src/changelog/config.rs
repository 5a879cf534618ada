//! Change-log configuration.

use crate::changelog::error::StoreError;
use serde::{Deserialize, Serialize};

/// Default note size, matching the width of the note column.
pub const DEFAULT_NOTE_LIMIT: usize = 1024;

/// Settings for the in-memory change log.
///
/// Every field has a default, so partial documents are accepted:
///
/// ```rust
/// use transition::changelog::ChangeLogConfig;
///
/// let config = ChangeLogConfig::from_json("{}").unwrap();
/// assert_eq!(config.note_limit, 1024);
///
/// let config = ChangeLogConfig::from_json(r#"{"note_limit": 64}"#).unwrap();
/// assert_eq!(config.note_limit, 64);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeLogConfig {
    /// Maximum note length in bytes.
    pub note_limit: usize,
}

impl ChangeLogConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json).map_err(|e| StoreError::DeserializationFailed(e.to_string()))
    }

    /// Override the maximum note length in bytes.
    pub fn with_note_limit(mut self, limit: usize) -> Self {
        self.note_limit = limit;
        self
    }
}

impl Default for ChangeLogConfig {
    fn default() -> Self {
        Self {
            note_limit: DEFAULT_NOTE_LIMIT,
        }
    }
}
