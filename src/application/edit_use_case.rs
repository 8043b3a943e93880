// ============================================================
// Layer 2 — EditUseCase
// ============================================================
// Drops a selection of columns from every record of a dataset
// and writes the result to a new file (`<data>.edited` unless
// an output path is given).

use anyhow::{Context, Result};
use std::{fs::File, io::BufReader, path::PathBuf};

use crate::data::feature_editor::{drop_columns, ColumnSelection};
use crate::infra::{config::with_suffix, output::AtomicOutput};

pub struct EditUseCase {
    data_path: PathBuf,
    columns:   ColumnSelection,
    out_path:  Option<PathBuf>,
    delimiter: char,
}

impl EditUseCase {
    pub fn new(
        data_path: impl Into<PathBuf>,
        columns:   ColumnSelection,
        out_path:  Option<PathBuf>,
        delimiter: char,
    ) -> Self {
        Self {
            data_path: data_path.into(),
            columns,
            out_path,
            delimiter,
        }
    }

    /// Returns the number of records written and the output path.
    pub fn execute(&self) -> Result<(usize, PathBuf)> {
        let out_path = self
            .out_path
            .clone()
            .unwrap_or_else(|| with_suffix(&self.data_path, ".edited"));

        let input = File::open(&self.data_path)
            .with_context(|| format!("Cannot open dataset '{}'", self.data_path.display()))?;
        let mut output = AtomicOutput::create(&out_path)?;

        let written = drop_columns(BufReader::new(input), &mut output, &self.columns, self.delimiter)
            .with_context(|| format!("Cannot edit '{}'", self.data_path.display()))?;
        Ok((written, output.commit()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_drops_selected_columns() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data.csv");
        fs::write(&data, "a,b,c,d\ne,f,g,h\n").unwrap();

        let (n, out) = EditUseCase::new(&data, "1-2".parse().unwrap(), None, ',')
            .execute()
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(fs::read_to_string(out).unwrap(), "a,d\ne,h\n");
    }
}
