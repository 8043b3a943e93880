// ============================================================
// Layer 2 — LabelUseCase
// ============================================================
// Labels a raw dataset file with a rule file:
//
//   Step 1: Load and parse the rule file      (Layer 4 - rule_table)
//   Step 2: Build the labeler from the config (Layer 4 - labeler)
//   Step 3: Stream data → labeled output file (Layer 4 + Layer 5)
//
// A malformed rule file stops the run before any output is
// created. The output file only appears once labeling finished.

use anyhow::{Context, Result};
use std::{
    fs::File,
    io::BufReader,
    path::PathBuf,
};

use crate::data::{
    labeler::{LabelReport, Labeler},
    rule_table::RuleTable,
};
use crate::infra::{
    config::{with_suffix, PipelineConfig},
    output::AtomicOutput,
};

/// What to label and where to put the result.
#[derive(Debug, Clone)]
pub struct LabelJob {
    pub rules_path: PathBuf,
    pub data_path:  PathBuf,
    /// Defaults to `<data><labeled_suffix>`
    pub out_path:   Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct LabelOutcome {
    pub report:     LabelReport,
    pub rule_count: usize,
    pub out_path:   PathBuf,
}

pub struct LabelUseCase {
    job:    LabelJob,
    config: PipelineConfig,
}

impl LabelUseCase {
    pub fn new(job: LabelJob, config: PipelineConfig) -> Self {
        Self { job, config }
    }

    pub fn execute(&self) -> Result<LabelOutcome> {
        let job = &self.job;
        let cfg = &self.config;

        // ── Step 1: Rules ─────────────────────────────────────────────────────
        let rules = RuleTable::load(&job.rules_path)
            .with_context(|| format!("Cannot load rules from '{}'", job.rules_path.display()))?;
        if rules.is_empty() {
            tracing::warn!(
                "Rule file '{}' has no rules; every record will be '{}'",
                job.rules_path.display(),
                cfg.default_label
            );
        }

        // ── Step 2: Labeler ───────────────────────────────────────────────────
        let mut labeler = Labeler::new(&rules)
            .with_delimiter(cfg.delimiter)
            .with_default_label(cfg.default_label.clone());
        if let Some(min) = cfg.min_fields {
            labeler = labeler.with_min_fields(min);
        }
        tracing::debug!("Records need at least {} field(s)", labeler.min_fields());

        // ── Step 3: Stream the dataset ────────────────────────────────────────
        let out_path = job
            .out_path
            .clone()
            .unwrap_or_else(|| with_suffix(&job.data_path, &cfg.labeled_suffix));

        let input = File::open(&job.data_path)
            .with_context(|| format!("Cannot open dataset '{}'", job.data_path.display()))?;
        let mut output = AtomicOutput::create(&out_path)?;

        tracing::info!(
            "Labeling '{}' into '{}'",
            job.data_path.display(),
            out_path.display()
        );
        let report = labeler
            .label_stream(BufReader::new(input), &mut output)
            .with_context(|| format!("Labeling '{}' failed", job.data_path.display()))?;
        let out_path = output.commit()?;

        Ok(LabelOutcome {
            report,
            rule_count: rules.len(),
            out_path,
        })
    }
}
