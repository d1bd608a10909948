//! Render options, settable from a JSON file and from the command line.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderOptions {
    /// Tempo for the jcx `Q:` line instead of the score's own
    pub tempo: Option<f64>,
    /// Measures per system instead of the dialect default
    pub measures_per_system: Option<usize>,
}

impl RenderOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Fill unset fields from `other`.
    pub fn or(self, other: RenderOptions) -> RenderOptions {
        RenderOptions {
            tempo: self.tempo.or(other.tempo),
            measures_per_system: self.measures_per_system.or(other.measures_per_system),
        }
    }

    /// Measures per system for a dialect whose default is `default`.
    pub fn measures_per_system_or(&self, default: usize) -> usize {
        self.measures_per_system.filter(|n| *n > 0).unwrap_or(default)
    }
}
