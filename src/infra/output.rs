// ============================================================
// Layer 5 — Atomic Output Files
// ============================================================
// Every result file is first written to a temporary file next
// to its destination, then renamed into place on success.
//
//   create("data.csv.train")
//        │    writes go to  data.csv.train.XXXXXX.part
//        ▼
//   commit()  → rename to data.csv.train
//
// If the writer is dropped without commit() (an error, a `?`
// early return), the temporary file is deleted and any previous
// output at the destination is left untouched.
//
// Reference: tempfile crate documentation (NamedTempFile::persist)

use anyhow::{Context, Result};
use std::{
    io::{BufWriter, Write},
    path::PathBuf,
};
use tempfile::NamedTempFile;

pub struct AtomicOutput {
    writer: BufWriter<NamedTempFile>,
    target: PathBuf,
}

impl AtomicOutput {
    pub fn create(target: impl Into<PathBuf>) -> Result<Self> {
        let target = target.into();
        let dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let prefix = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());

        let file = tempfile::Builder::new()
            .prefix(&format!("{prefix}."))
            .suffix(".part")
            .tempfile_in(&dir)
            .with_context(|| format!("Cannot create output next to '{}'", target.display()))?;

        Ok(Self {
            writer: BufWriter::new(file),
            target,
        })
    }

    /// Flush and move the finished file to its destination.
    pub fn commit(self) -> Result<PathBuf> {
        let target = self.target;
        let file = self
            .writer
            .into_inner()
            .map_err(|e| e.into_error())
            .with_context(|| format!("Cannot flush '{}'", target.display()))?;
        file.persist(&target)
            .map_err(|e| e.error)
            .with_context(|| format!("Cannot write '{}'", target.display()))?;

        tracing::debug!("Wrote '{}'", target.display());
        Ok(target)
    }
}

impl Write for AtomicOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_commit_moves_file_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.train");
        let mut out = AtomicOutput::create(&target).unwrap();
        writeln!(out, "a,b,A").unwrap();
        assert!(!target.exists());

        out.commit().unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "a,b,A\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_drop_without_commit_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.test");
        fs::write(&target, "previous\n").unwrap();
        {
            let mut out = AtomicOutput::create(&target).unwrap();
            writeln!(out, "half written").unwrap();
        }
        assert_eq!(fs::read_to_string(&target).unwrap(), "previous\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
