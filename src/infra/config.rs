// ============================================================
// Layer 5 — Pipeline Configuration
// ============================================================
// Settings shared by every command, loadable from a JSON file
// passed with --config. Any key may be omitted; missing keys
// take their default value. Command-line flags override the
// file afterwards.
//
// Example config.json:
//   {
//     "delimiter": ",",
//     "default_label": "OTHER",
//     "storage": "disk",
//     "temp_dir": "/scratch/tmp",
//     "seed": 42
//   }
//
// Reference: serde / serde_json documentation
//            Rust Book §9 (Error Handling with anyhow)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use crate::data::{bucket::StorageMode, labeler::DEFAULT_LABEL};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Field separator of every dataset line
    pub delimiter: char,

    /// Label given to records no rule matches
    pub default_label: String,

    /// Minimum fields a record needs to be labeled.
    /// When unset, derived from the highest rule feature index.
    pub min_fields: Option<usize>,

    /// Backing store for class buckets while splitting
    pub storage: StorageMode,

    /// Directory for temporary bucket files
    pub temp_dir: Option<PathBuf>,

    /// RNG seed for the split; drawn at random when unset
    pub seed: Option<u64>,

    pub labeled_suffix: String,
    pub train_suffix:   String,
    pub test_suffix:    String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delimiter:      ',',
            default_label:  DEFAULT_LABEL.to_string(),
            min_fields:     None,
            storage:        StorageMode::Memory,
            temp_dir:       None,
            seed:           None,
            labeled_suffix: ".labeled".to_string(),
            train_suffix:   ".train".to_string(),
            test_suffix:    ".test".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file, or return defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        let config: Self = serde_json::from_str(&json)
            .with_context(|| format!("Invalid config in '{}'", path.display()))?;

        tracing::debug!("Loaded config from '{}': {:?}", path.display(), config);
        Ok(config)
    }
}

/// `data.csv` + `.train` → `data.csv.train`
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
