// ============================================================
// Layer 2 — ConvertUseCase
// ============================================================
// Turns an ARFF file into a plain delimited dataset that the
// label and split commands can read:
//
//   Step 1: Read the ARFF header        (Layer 4 - arff)
//   Step 2: Copy the @data rows out     (Layer 4 - arff)
//   Step 3: Commit the output file      (Layer 5 - output)

use anyhow::{Context, Result};
use std::{fs::File, io::BufReader, path::PathBuf};

use crate::data::arff::{self, ArffConversion};
use crate::infra::{config::with_suffix, output::AtomicOutput};

pub struct ConvertUseCase {
    arff_path: PathBuf,
    out_path:  Option<PathBuf>,
}

impl ConvertUseCase {
    /// Output defaults to `<arff>.csv`
    pub fn new(arff_path: impl Into<PathBuf>, out_path: Option<PathBuf>) -> Self {
        Self {
            arff_path: arff_path.into(),
            out_path,
        }
    }

    pub fn execute(&self) -> Result<(ArffConversion, PathBuf)> {
        let out_path = self
            .out_path
            .clone()
            .unwrap_or_else(|| with_suffix(&self.arff_path, ".csv"));

        let input = File::open(&self.arff_path)
            .with_context(|| format!("Cannot open ARFF file '{}'", self.arff_path.display()))?;
        let mut output = AtomicOutput::create(&out_path)?;

        let conversion = arff::convert(BufReader::new(input), &mut output)
            .with_context(|| format!("Cannot convert '{}'", self.arff_path.display()))?;
        let out_path = output.commit()?;

        tracing::info!(
            "Converted relation '{}' ({} attribute(s), {} row(s)) to '{}'",
            conversion.header.relation.as_deref().unwrap_or("unnamed"),
            conversion.header.attributes.len(),
            conversion.rows,
            out_path.display()
        );
        Ok((conversion, out_path))
    }
}
