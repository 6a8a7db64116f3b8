//! Paddock configuration stored as JSON

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::changelog::DEFAULT_LOG_LIMIT;
use crate::error::SetupError;
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::range::{RangePolicy, RangeSpec};
use crate::store::JsonFileStore;

/// Settings for the setup core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddockConfig {
    /// Quiet period before an autosave fires
    pub autosave_debounce_ms: u64,

    /// Default number of history versions to read
    pub history_limit: usize,

    /// Default number of change-log entries to read
    pub log_limit: usize,

    /// How out-of-range edits are handled
    pub range_policy: RangePolicy,

    /// Per-path ranges layered over the built-in registry
    pub range_overrides: BTreeMap<String, RangeSpec>,

    /// Directory for the JSON file backend (platform data dir if unset)
    pub data_dir: Option<PathBuf>,
}

impl Default for PaddockConfig {
    fn default() -> Self {
        Self {
            autosave_debounce_ms: 800,
            history_limit: DEFAULT_HISTORY_LIMIT,
            log_limit: DEFAULT_LOG_LIMIT,
            range_policy: RangePolicy::Clamp,
            range_overrides: BTreeMap::new(),
            data_dir: None,
        }
    }
}

impl PaddockConfig {
    /// Load from a JSON file; a missing file yields the defaults
    ///
    /// Every range override is checked, so a bad entry fails here rather than
    /// when the validator is built.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SetupError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        for (path, spec) in &config.range_overrides {
            spec.validate(path)?;
        }
        tracing::info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Save as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SetupError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Autosave quiet period
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }

    /// Resolved directory for the JSON file backend
    pub fn data_dir(&self) -> Result<PathBuf, SetupError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(JsonFileStore::default_dir()?),
        }
    }
}
