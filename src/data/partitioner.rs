// ============================================================
// Layer 4 — Class Partitioner
// ============================================================
// Streams a labeled dataset once and groups its records by
// label into one ClassBucket per label:
//
//   labeled stream ──► [ A: r0 r3 r4 ... ]
//                      [ B: r1 r5 ... ]
//                      [ OTHER: r2 ... ]
//
// Guarantees:
//   - every record lands in exactly one bucket
//   - inside a bucket, records keep their dataset order
//   - labels are enumerated in first-seen order
//
// The sampler needs each bucket's full size before it can draw
// a permutation, so partitioning always completes before any
// sampling starts.
//
// If reading fails half way, the partially built Partition is
// dropped by `?` and any temporary bucket files go with it.
//
// Reference: Rust Book §8 (Hash Maps)
//            Rust Book §9 (Propagating Errors)

use std::{
    collections::HashMap,
    io::BufRead,
    path::{Path, PathBuf},
};

use crate::data::bucket::{ClassBucket, StorageMode};
use crate::data::loader::LineReader;
use crate::domain::error::PipelineResult;
use crate::domain::record::LabeledRecord;

/// Result of a partitioning pass: buckets plus their counts.
#[derive(Debug, Default)]
pub struct Partition {
    buckets: Vec<ClassBucket>,
    index:   HashMap<String, usize>,
}

impl Partition {
    /// (label, record count) pairs in first-seen order
    pub fn counts(&self) -> Vec<(String, usize)> {
        self.buckets
            .iter()
            .map(|b| (b.label().to_string(), b.len()))
            .collect()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// Number of distinct labels
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total records across all buckets
    pub fn total(&self) -> usize {
        self.buckets.iter().map(ClassBucket::len).sum()
    }

    /// Hand the buckets over for sampling, in first-seen order.
    pub fn into_buckets(self) -> Vec<ClassBucket> {
        self.buckets
    }

    fn push(&mut self, record: &LabeledRecord, mode: StorageMode, temp_dir: Option<&Path>) -> PipelineResult<()> {
        let slot = match self.index.get(&record.label) {
            Some(&i) => i,
            None => {
                tracing::debug!("New label '{}' first seen on line {}", record.label, record.line_no);
                self.buckets.push(ClassBucket::new(&record.label, mode, temp_dir)?);
                self.index.insert(record.label.clone(), self.buckets.len() - 1);
                self.buckets.len() - 1
            }
        };
        self.buckets[slot].push(&record.line)
    }
}

/// Groups labeled records into per-label buckets.
#[derive(Debug, Clone, Default)]
pub struct Partitioner {
    storage:  StorageMode,
    temp_dir: Option<PathBuf>,
}

impl Partitioner {
    pub fn new(storage: StorageMode) -> Self {
        Self { storage, temp_dir: None }
    }

    /// Directory for disk-backed buckets
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Consume a labeled record stream to exhaustion.
    pub fn partition<I>(&self, records: I) -> PipelineResult<Partition>
    where
        I: IntoIterator<Item = PipelineResult<LabeledRecord>>,
    {
        let mut partition = Partition::default();
        for record in records {
            partition.push(&record?, self.storage, self.temp_dir.as_deref())?;
        }

        tracing::info!(
            "Partitioned {} record(s) into {} label(s) using {} storage",
            partition.total(),
            partition.len(),
            self.storage
        );
        Ok(partition)
    }

    /// Partition an already-labeled dataset, taking the last field of
    /// each line as its label. Blank lines are ignored.
    pub fn partition_reader<R: BufRead>(&self, reader: LineReader<R>, delimiter: char) -> PipelineResult<Partition> {
        let records = reader.filter_map(move |line| match line {
            Ok((_, l)) if l.trim().is_empty() => None,
            Ok((line_no, l)) => Some(Ok(LabeledRecord::from_labeled_line(line_no, l, delimiter))),
            Err(e) => Some(Err(e)),
        });
        self.partition(records)
    }
}
