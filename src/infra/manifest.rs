// ============================================================
// Layer 5 — Split Manifest
// ============================================================
// Records how a train/test split was produced, next to the
// split files themselves, so the exact split can be rebuilt.
//
// What gets saved (data.csv.split.json):
//   - the input and output file paths
//   - the RNG seed actually used
//   - the bucket storage mode
//   - per label: records available, request, train and test counts
//
// Re-running `split` with the same data, requests and --seed
// reproduces the same files.
//
// Reference: serde_json documentation

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::data::{bucket::StorageMode, sampler::LabelSplit};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitManifest {
    pub data_file:  String,
    pub train_file: String,
    pub test_file:  String,
    pub seed:       u64,
    pub storage:    StorageMode,
    pub labels:     Vec<LabelSplit>,
}

impl SplitManifest {
    pub fn train_total(&self) -> usize {
        self.labels.iter().map(|l| l.train).sum()
    }

    pub fn test_total(&self) -> usize {
        self.labels.iter().map(|l| l.test).sum()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("Cannot write manifest to '{}'", path.display()))?;
        tracing::debug!("Saved split manifest to '{}'", path.display());
        Ok(())
    }
}
