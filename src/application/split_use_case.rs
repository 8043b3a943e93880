// ============================================================
// Layer 2 — SplitUseCase
// ============================================================
// Builds the training and testing files from a labeled dataset.
// Runs in two phases so the interactive menu can show the
// per-label counts before asking how many of each to train on:
//
//   partition()  Step 1: read the labeled file once into
//                        per-label buckets (Layer 4 - partitioner)
//
//   sample()     Step 2: pick the RNG seed
//                Step 3: split every bucket into the two
//                        output files     (Layer 4 - sampler)
//                Step 4: save the manifest (Layer 5 - manifest)
//
// Both output files are committed only after every bucket was
// split, so a rejected request or an I/O failure leaves no
// partial .train / .test files behind. Temporary bucket files
// are removed whichever way this returns.

use anyhow::{Context, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::path::PathBuf;

use crate::data::{
    loader::LineReader,
    partitioner::{Partition, Partitioner},
    sampler::{self, SampleCounts},
};
use crate::infra::{
    config::{with_suffix, PipelineConfig},
    manifest::SplitManifest,
    output::AtomicOutput,
};

#[derive(Debug, Clone)]
pub struct SplitOutcome {
    pub manifest:      SplitManifest,
    pub manifest_path: PathBuf,
}

pub struct SplitUseCase {
    data_path: PathBuf,
    config:    PipelineConfig,
}

impl SplitUseCase {
    pub fn new(data_path: impl Into<PathBuf>, config: PipelineConfig) -> Self {
        Self {
            data_path: data_path.into(),
            config,
        }
    }

    /// Run both phases with requests known up front.
    pub fn execute(&self, counts: &SampleCounts) -> Result<SplitOutcome> {
        let partition = self.partition()?;
        self.sample(partition, counts)
    }

    /// Phase 1: group the labeled records by label.
    pub fn partition(&self) -> Result<Partition> {
        let cfg = &self.config;
        let lines = LineReader::open(&self.data_path)?;

        let mut partitioner = Partitioner::new(cfg.storage);
        if let Some(dir) = &cfg.temp_dir {
            partitioner = partitioner.with_temp_dir(dir);
        }

        tracing::info!("Partitioning '{}' by label", self.data_path.display());
        partitioner
            .partition_reader(lines, cfg.delimiter)
            .with_context(|| format!("Cannot partition '{}'", self.data_path.display()))
    }

    /// Phase 2: draw the training subset of every label and write
    /// both output files.
    pub fn sample(&self, partition: Partition, counts: &SampleCounts) -> Result<SplitOutcome> {
        let cfg = &self.config;

        // ── Step 2: Seed ──────────────────────────────────────────────────────
        let seed = cfg.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut rng = StdRng::seed_from_u64(seed);
        tracing::info!("Sampling with seed {seed}");

        // ── Step 3: Split ─────────────────────────────────────────────────────
        let train_path = with_suffix(&self.data_path, &cfg.train_suffix);
        let test_path = with_suffix(&self.data_path, &cfg.test_suffix);
        let mut train = AtomicOutput::create(&train_path)?;
        let mut test = AtomicOutput::create(&test_path)?;

        let labels = sampler::split(partition, counts, &mut rng, &mut train, &mut test)
            .with_context(|| format!("Cannot split '{}'", self.data_path.display()))?;

        let train_path = train.commit()?;
        let test_path = test.commit()?;

        // ── Step 4: Manifest ──────────────────────────────────────────────────
        let manifest = SplitManifest {
            data_file:  self.data_path.display().to_string(),
            train_file: train_path.display().to_string(),
            test_file:  test_path.display().to_string(),
            seed,
            storage:    cfg.storage,
            labels,
        };
        let manifest_path = with_suffix(&self.data_path, ".split.json");
        manifest.save(&manifest_path)?;

        tracing::info!(
            "Split complete: {} training, {} testing record(s)",
            manifest.train_total(),
            manifest.test_total()
        );
        Ok(SplitOutcome { manifest, manifest_path })
    }
}
