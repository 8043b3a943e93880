// ============================================================
// Layer 4 — Class Bucket
// ============================================================
// An append-only store holding every labeled line of one class,
// in the order the lines appeared in the dataset.
//
// Two backing stores are available:
//
//   Memory  — a Vec<String>; fastest, bounded by RAM
//   Disk    — a NamedTempFile; one temporary file per class
//
// Lifecycle:
//
//   ClassBucket::new()   created on the first record of a label
//        │
//        ▼
//   push() ... push()    one call per record, in dataset order
//        │
//        ▼
//   into_reader()        consumes the bucket; it can be read once
//        │
//        ▼
//   BucketReader         yields the lines back in the same order
//
// Temporary files are owned by the bucket (and then by its
// reader). NamedTempFile deletes its file on drop, so the file
// is removed on every exit path, including early returns from
// an error half way through partitioning or sampling.
//
// Reference: tempfile crate documentation
//            Rust Book §15 (Running Code on Cleanup with Drop)

use std::{
    fmt,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::data::loader::LineReader;
use crate::domain::error::{PipelineError, PipelineResult};

/// Where bucket contents are kept while partitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    #[default]
    Memory,
    Disk,
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageMode::Memory => write!(f, "memory"),
            StorageMode::Disk => write!(f, "disk"),
        }
    }
}

impl FromStr for StorageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(StorageMode::Memory),
            "disk" | "file" => Ok(StorageMode::Disk),
            other => Err(format!("unknown storage mode '{other}' (expected memory or disk)")),
        }
    }
}

enum BucketStore {
    Memory(Vec<String>),
    Disk(BufWriter<NamedTempFile>),
}

/// All records of one label, in original order.
pub struct ClassBucket {
    label: String,
    count: usize,
    store: BucketStore,
}

impl ClassBucket {
    /// Create an empty bucket with the requested backing store.
    /// Disk buckets go to `temp_dir`, or the system temp directory.
    pub fn new(label: impl Into<String>, mode: StorageMode, temp_dir: Option<&Path>) -> PipelineResult<Self> {
        let label = label.into();
        let store = match mode {
            StorageMode::Memory => BucketStore::Memory(Vec::new()),
            StorageMode::Disk => {
                let file = create_temp_file(&label, temp_dir)?;
                tracing::debug!(
                    "Created temporary bucket file for '{}': {}",
                    label,
                    file.path().display()
                );
                BucketStore::Disk(BufWriter::new(file))
            }
        };
        Ok(Self { label, count: 0, store })
    }

    /// Append one serialised record.
    pub fn push(&mut self, line: &str) -> PipelineResult<()> {
        match &mut self.store {
            BucketStore::Memory(lines) => lines.push(line.to_string()),
            BucketStore::Disk(writer) => writeln!(writer, "{line}").map_err(|e| {
                PipelineError::resource(format!("cannot write bucket for label '{}'", self.label), e)
            })?,
        }
        self.count += 1;
        Ok(())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn len(&self) -> usize {
        self.count
    }

    /// Path of the backing temporary file, for disk buckets
    pub fn temp_path(&self) -> Option<&Path> {
        match &self.store {
            BucketStore::Memory(_) => None,
            BucketStore::Disk(writer) => Some(writer.get_ref().path()),
        }
    }

    /// Finish writing and return a one-shot reader over the records.
    pub fn into_reader(self) -> PipelineResult<BucketReader> {
        let label = self.label;
        let inner = match self.store {
            BucketStore::Memory(lines) => ReaderInner::Memory(lines.into_iter()),
            BucketStore::Disk(writer) => {
                let context = || format!("cannot reopen bucket for label '{label}'");
                let file = writer
                    .into_inner()
                    .map_err(|e| PipelineError::resource(context(), e.into_error()))?;
                let handle = file
                    .reopen()
                    .map_err(|e| PipelineError::resource(context(), e))?;
                ReaderInner::Disk {
                    lines: LineReader::new(BufReader::new(handle), format!("bucket '{label}'")),
                    _file: file,
                }
            }
        };
        Ok(BucketReader { label, inner })
    }
}

impl fmt::Debug for ClassBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassBucket")
            .field("label", &self.label)
            .field("count", &self.count)
            .field("temp_path", &self.temp_path())
            .finish()
    }
}

enum ReaderInner {
    Memory(std::vec::IntoIter<String>),
    Disk {
        lines: LineReader<BufReader<File>>,
        // Held so the file is deleted only after reading ends
        _file: NamedTempFile,
    },
}

/// Sequential, single-use reader over a drained bucket.
pub struct BucketReader {
    label: String,
    inner: ReaderInner,
}

impl BucketReader {
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Iterator for BucketReader {
    type Item = PipelineResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            ReaderInner::Memory(lines) => lines.next().map(Ok),
            ReaderInner::Disk { lines, .. } => lines.next().map(|r| r.map(|(_, line)| line)),
        }
    }
}

fn create_temp_file(label: &str, temp_dir: Option<&Path>) -> PipelineResult<NamedTempFile> {
    // Labels come from user data; keep only filename-safe characters
    let safe: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .take(32)
        .collect();
    let prefix = format!("label-split.{safe}.");

    let mut builder = tempfile::Builder::new();
    builder.prefix(&prefix).suffix(".tmp");
    let result = match temp_dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    };
    result.map_err(|e| {
        PipelineError::resource(format!("cannot create temporary bucket for label '{label}'"), e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(mode: StorageMode, dir: Option<&Path>) -> ClassBucket {
        let mut b = ClassBucket::new("A", mode, dir).unwrap();
        for i in 0..5 {
            b.push(&format!("{i},x,A")).unwrap();
        }
        b
    }

    #[test]
    fn test_memory_bucket_preserves_order() {
        let b = fill(StorageMode::Memory, None);
        assert_eq!(b.len(), 5);
        assert!(b.temp_path().is_none());
        let lines: Vec<String> = b.into_reader().unwrap().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["0,x,A", "1,x,A", "2,x,A", "3,x,A", "4,x,A"]);
    }

    #[test]
    fn test_disk_bucket_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let b = fill(StorageMode::Disk, Some(dir.path()));
        assert!(b.temp_path().unwrap().starts_with(dir.path()));
        let reader = b.into_reader().unwrap();
        assert_eq!(reader.label(), "A");
        let lines: Vec<String> = reader.map(|l| l.unwrap()).collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "0,x,A");
        assert_eq!(lines[4], "4,x,A");
    }

    #[test]
    fn test_disk_bucket_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let b = fill(StorageMode::Disk, Some(dir.path()));
        let path = b.temp_path().unwrap().to_path_buf();
        assert!(path.exists());
        drop(b);
        assert!(!path.exists());
    }

    #[test]
    fn test_disk_bucket_removed_after_reading() {
        let dir = tempfile::tempdir().unwrap();
        let b = fill(StorageMode::Disk, Some(dir.path()));
        let path = b.temp_path().unwrap().to_path_buf();
        let mut reader = b.into_reader().unwrap();
        assert!(reader.next().is_some());
        assert!(path.exists());
        drop(reader);
        assert!(!path.exists());
    }

    #[test]
    fn test_unsafe_label_characters_in_temp_name() {
        let dir = tempfile::tempdir().unwrap();
        let b = ClassBucket::new("a/b c", StorageMode::Disk, Some(dir.path())).unwrap();
        let name = b.temp_path().unwrap().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("label-split.a_b_c."));
    }

    #[test]
    fn test_storage_mode_parse() {
        assert_eq!("disk".parse::<StorageMode>(), Ok(StorageMode::Disk));
        assert_eq!("Memory".parse::<StorageMode>(), Ok(StorageMode::Memory));
        assert!("cloud".parse::<StorageMode>().is_err());
    }
}
