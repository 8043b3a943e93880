// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// The entry point for all user interaction. Parses arguments
// with clap and hands the work to Layer 2 (application).
//
// Commands:
//   1. `label`          — raw data set + rule file → labeled set
//   2. `split`          — labeled set → .train / .test files
//   3. `convert`        — ARFF → plain rows
//   4. `drop-features`  — remove columns
//   5. `interactive`    — numbered menu (also the default)
//
// This layer only routes and prints; it never computes.

pub mod commands;
pub mod interactive;

use anyhow::Result;
use clap::Parser;
use std::{
    io::{self, Write},
    path::PathBuf,
};

use crate::application::{
    convert_use_case::ConvertUseCase,
    edit_use_case::EditUseCase,
    label_use_case::{LabelOutcome, LabelUseCase},
    split_use_case::{SplitOutcome, SplitUseCase},
};
use crate::data::{arff::ArffConversion, sampler::SampleCounts};
use crate::infra::config::PipelineConfig;
use commands::{Commands, ConvertArgs, DropFeaturesArgs, LabelArgs, SplitArgs};
use interactive::Session;

#[derive(Parser, Debug)]
#[command(
    name = "label-split",
    version,
    about = "Label flat-file data sets by rule and build stratified train/test splits."
)]
pub struct Cli {
    /// Print extra, detailed output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON file with pipeline settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The task to run; the interactive menu when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config = PipelineConfig::load(self.config.as_deref())?;

        match self.command.unwrap_or(Commands::Interactive) {
            Commands::Label(args) => run_label(args, config),
            Commands::Split(args) => run_split(args, config),
            Commands::Convert(args) => run_convert(args),
            Commands::DropFeatures(args) => run_drop_features(args, config),
            Commands::Interactive => {
                let stdin = io::stdin();
                Session::new(stdin.lock(), io::stdout(), config).run()
            }
        }
    }
}

fn run_label(args: LabelArgs, mut config: PipelineConfig) -> Result<()> {
    args.apply(&mut config);
    let outcome = LabelUseCase::new((&args).into(), config).execute()?;
    print_label_outcome(&mut io::stdout(), &outcome)
}

fn run_split(args: SplitArgs, mut config: PipelineConfig) -> Result<()> {
    args.apply(&mut config);

    let mut counts = SampleCounts::new(args.default);
    for (label, request) in &args.take {
        counts.set(label.clone(), *request);
    }

    let outcome = SplitUseCase::new(&args.data, config).execute(&counts)?;
    print_split_outcome(&mut io::stdout(), &outcome)
}

fn run_convert(args: ConvertArgs) -> Result<()> {
    let (conversion, out) = ConvertUseCase::new(args.arff, args.out).execute()?;
    print_conversion(&mut io::stdout(), &conversion, &out)
}

fn run_drop_features(args: DropFeaturesArgs, mut config: PipelineConfig) -> Result<()> {
    args.format.apply(&mut config);
    let (written, out) =
        EditUseCase::new(args.data, args.columns, args.out, config.delimiter).execute()?;
    writeln!(io::stdout(), "Wrote {written} record(s) to {}", out.display())?;
    Ok(())
}

// ─── Result Printing ──────────────────────────────────────────────────────────
// Shared by the subcommands and the interactive menu.

pub fn print_label_outcome<W: Write>(w: &mut W, outcome: &LabelOutcome) -> Result<()> {
    let report = &outcome.report;
    writeln!(w, "Applied {} rule(s)", outcome.rule_count)?;
    for (label, count) in &report.per_label {
        writeln!(w, "  {label:<16} {count}")?;
    }
    writeln!(w, "Labeled {} record(s) into {}", report.labeled, outcome.out_path.display())?;
    if report.skipped > 0 {
        let lines: Vec<String> = report.skipped_lines.iter().map(usize::to_string).collect();
        let more = if report.skipped > report.skipped_lines.len() { ", ..." } else { "" };
        writeln!(
            w,
            "Skipped {} malformed record(s) (lines {}{more})",
            report.skipped,
            lines.join(", ")
        )?;
    }
    Ok(())
}

pub fn print_split_outcome<W: Write>(w: &mut W, outcome: &SplitOutcome) -> Result<()> {
    let m = &outcome.manifest;
    writeln!(w, "{:<16} {:>9} {:>9} {:>9} {:>9}", "label", "available", "requested", "train", "test")?;
    for l in &m.labels {
        writeln!(
            w,
            "{:<16} {:>9} {:>9} {:>9} {:>9}",
            l.label, l.available, l.requested, l.train, l.test
        )?;
    }
    writeln!(w, "Training set: {} record(s) in {}", m.train_total(), m.train_file)?;
    writeln!(w, "Testing set:  {} record(s) in {}", m.test_total(), m.test_file)?;
    writeln!(w, "Seed {} recorded in {}", m.seed, outcome.manifest_path.display())?;
    Ok(())
}

pub fn print_conversion<W: Write>(w: &mut W, conversion: &ArffConversion, out: &std::path::Path) -> Result<()> {
    let header = &conversion.header;
    writeln!(w, "Relation: {}", header.relation.as_deref().unwrap_or("(unnamed)"))?;
    writeln!(w, "Read in {} attribute(s)", header.attributes.len())?;
    for (i, attr) in header.attributes.iter().enumerate() {
        writeln!(w, "  {i:>3}  {}  {}", attr.name, attr.kind)?;
    }
    writeln!(w, "Wrote {} row(s) to {}", conversion.rows, out.display())?;
    Ok(())
}
