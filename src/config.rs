//! Run configuration, loadable from JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::spe::SpeConfig;

/// Configuration of a full layout run.
///
/// Missing fields take their defaults, so `{}` is a valid file:
///
/// ```json
/// { "spe": { "cycles": 100, "seed": 42 }, "big_data_mode": true }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Solver parameters.
    pub spe: SpeConfig,
    /// Let the viewer load one level at a time instead of everything.
    pub big_data_mode: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            spe: SpeConfig::default(),
            big_data_mode: true,
        }
    }
}

impl LayoutConfig {
    /// Read a configuration file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: LayoutConfig = serde_json::from_str(&text)?;
        config.spe.validate()?;
        Ok(config)
    }
}
