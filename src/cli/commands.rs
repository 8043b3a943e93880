// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the subcommands and all their flags:
//
//   label          — label a raw dataset with a rule file
//   split          — build stratified training / testing files
//   convert        — ARFF → plain delimited rows
//   drop-features  — remove columns from every record
//   interactive    — the numbered menu (default)
//
// Flags that also exist in the config file (delimiter, seed,
// storage, ...) are optional here and only override the file
// when given.
//
// Reference: clap derive documentation

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::label_use_case::LabelJob;
use crate::data::{bucket::StorageMode, feature_editor::ColumnSelection};
use crate::domain::sample_request::SampleRequest;
use crate::infra::config::PipelineConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Label a data set using a rule file
    Label(LabelArgs),

    /// Build a training and a testing set from a labeled data set
    Split(SplitArgs),

    /// Convert an ARFF file to plain comma-delimited rows
    Convert(ConvertArgs),

    /// Remove columns from every record of a data set
    DropFeatures(DropFeaturesArgs),

    /// Choose a task from the interactive menu
    Interactive,
}

/// Settings shared by commands that read delimited records
#[derive(Args, Debug, Default)]
pub struct FormatArgs {
    /// Field delimiter (default ',')
    #[arg(long)]
    pub delimiter: Option<char>,
}

#[derive(Args, Debug)]
pub struct LabelArgs {
    /// Rule file: "<idx>[,<idx>...] <value> <label>" per line
    #[arg(long, default_value = "label.rules")]
    pub rules: PathBuf,

    /// Data set to label
    #[arg(long)]
    pub data: PathBuf,

    /// Output file (default: <data>.labeled)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Label for records no rule matches (default OTHER)
    #[arg(long)]
    pub default_label: Option<String>,

    /// Skip records with fewer fields than this
    /// (default: highest rule feature index + 1)
    #[arg(long)]
    pub min_fields: Option<usize>,

    #[command(flatten)]
    pub format: FormatArgs,
}

impl LabelArgs {
    /// Fold the flags that override config values into `cfg`
    pub fn apply(&self, cfg: &mut PipelineConfig) {
        self.format.apply(cfg);
        if let Some(label) = &self.default_label {
            cfg.default_label = label.clone();
        }
        if self.min_fields.is_some() {
            cfg.min_fields = self.min_fields;
        }
    }
}

/// Convert CLI LabelArgs into the application-layer LabelJob.
impl From<&LabelArgs> for LabelJob {
    fn from(a: &LabelArgs) -> Self {
        LabelJob {
            rules_path: a.rules.clone(),
            data_path:  a.data.clone(),
            out_path:   a.out.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Labeled data set (label in the last field)
    #[arg(long)]
    pub data: PathBuf,

    /// Training-set size for one label: LABEL=COUNT, LABEL=all or
    /// LABEL=none. Repeat for several labels.
    #[arg(long = "take", value_name = "LABEL=REQ", value_parser = parse_take)]
    pub take: Vec<(String, SampleRequest)>,

    /// Request used for labels without a --take
    #[arg(long, default_value = "none", allow_hyphen_values = true)]
    pub default: SampleRequest,

    /// RNG seed; a random one is chosen and reported when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Where to keep per-label buckets: memory or disk
    #[arg(long)]
    pub storage: Option<StorageMode>,

    /// Directory for temporary bucket files
    #[arg(long)]
    pub temp_dir: Option<PathBuf>,

    #[command(flatten)]
    pub format: FormatArgs,
}

impl SplitArgs {
    pub fn apply(&self, cfg: &mut PipelineConfig) {
        self.format.apply(cfg);
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        if let Some(storage) = self.storage {
            cfg.storage = storage;
        }
        if self.temp_dir.is_some() {
            cfg.temp_dir = self.temp_dir.clone();
        }
    }
}

impl FormatArgs {
    pub fn apply(&self, cfg: &mut PipelineConfig) {
        if let Some(d) = self.delimiter {
            cfg.delimiter = d;
        }
    }
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// ARFF file to convert
    #[arg(long)]
    pub arff: PathBuf,

    /// Output file (default: <arff>.csv)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DropFeaturesArgs {
    /// Data set to edit
    #[arg(long)]
    pub data: PathBuf,

    /// Columns to remove, e.g. "1,3-5"
    #[arg(long)]
    pub columns: ColumnSelection,

    /// Output file (default: <data>.edited)
    #[arg(long)]
    pub out: Option<PathBuf>,

    #[command(flatten)]
    pub format: FormatArgs,
}

/// Parse one `--take LABEL=REQ` value.
fn parse_take(s: &str) -> Result<(String, SampleRequest), String> {
    let (label, request) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected LABEL=REQ, got '{s}'"))?;
    if label.is_empty() {
        return Err(format!("missing label in '{s}'"));
    }
    Ok((label.to_string(), request.parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_take() {
        assert_eq!(parse_take("A=3"), Ok(("A".into(), SampleRequest::Exact(3))));
        assert_eq!(parse_take("smurf=all"), Ok(("smurf".into(), SampleRequest::All)));
        assert_eq!(parse_take("x=y=-1"), Ok(("x=y".into(), SampleRequest::All)));
        assert!(parse_take("A").is_err());
        assert!(parse_take("=3").is_err());
        assert!(parse_take("A=-4").is_err());
    }
}
