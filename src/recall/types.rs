use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Last-used inputs, keyed by tool name.
///
/// An opaque get/set store: tools serialize whatever input shape they use and
/// get it back verbatim with `--last`. The scoring engine never touches this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecallState {
    pub version: u32,
    #[serde(default)]
    pub entries: HashMap<String, RecallEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecallEntry {
    pub saved_at: DateTime<Utc>,
    pub values: serde_json::Value,
}

impl Default for RecallState {
    fn default() -> Self {
        Self::new()
    }
}

impl RecallState {
    /// Create a new empty recall state with version 1
    pub fn new() -> Self {
        Self {
            version: 1,
            entries: HashMap::new(),
        }
    }

    /// Store a tool's inputs, replacing any previous entry.
    pub fn remember<T: Serialize>(&mut self, tool: &str, values: &T) -> serde_json::Result<()> {
        let entry = RecallEntry {
            saved_at: Utc::now(),
            values: serde_json::to_value(values)?,
        };
        self.entries.insert(tool.to_string(), entry);
        Ok(())
    }

    /// Fetch a tool's last inputs, if any were saved and still deserialize.
    pub fn restore<T: DeserializeOwned>(&self, tool: &str) -> Option<T> {
        let entry = self.entries.get(tool)?;
        serde_json::from_value(entry.values.clone()).ok()
    }

    pub fn saved_at(&self, tool: &str) -> Option<DateTime<Utc>> {
        self.entries.get(tool).map(|entry| entry.saved_at)
    }

    /// Remove a tool's entry.
    /// Returns true if an entry was previously saved, false otherwise.
    pub fn forget(&mut self, tool: &str) -> bool {
        self.entries.remove(tool).is_some()
    }
}
