// ============================================================
// Layer 4 — Stratified Sampler
// ============================================================
// Splits every class bucket into a training part and a testing
// part, with an exact, caller-chosen training size per class.
//
// For one label with n records and a training request of k:
//
//   1. Shuffle the ordinal positions [0, n) and keep the first k
//      → k distinct positions, uniformly at random
//   2. Sort them ascending
//   3. Stream the bucket once; a cursor walks the sorted list:
//
//        ordinal:   0   1   2   3   4   5   6   7   8   9
//        selected:          ▲           ▲               ▲      (k = 3)
//        output:    T   T   TR  T   T   TR  T   T   T   TR
//
//      TR = training stream, T = testing stream
//
// Drawing positions from a permutation of [0, n) yields exactly
// k records, so the bucket size n must be known before sampling
// starts. The Partitioner always runs to completion first.
//
// Guarantees per label:
//   - |train| == k exactly, |train| + |test| == n
//   - no record goes to both streams, none is dropped
//   - each stream keeps the bucket's relative order
//
// All requests are checked before anything is written, so a bad
// request never leaves half-written output behind.
//
// Reference: rand crate documentation (SliceRandom, SeedableRng)
//            Knuth, TAOCP Vol. 2 §3.4.2 (Random Sampling)

use std::{collections::HashMap, io::Write};

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::data::bucket::ClassBucket;
use crate::data::partitioner::Partition;
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::sample_request::SampleRequest;

/// Requested training-set size per label.
#[derive(Debug, Clone, Default)]
pub struct SampleCounts {
    requests: HashMap<String, SampleRequest>,
    fallback: SampleRequest,
}

impl SampleCounts {
    /// `fallback` applies to labels with no explicit request
    pub fn new(fallback: SampleRequest) -> Self {
        Self {
            requests: HashMap::new(),
            fallback,
        }
    }

    pub fn set(&mut self, label: impl Into<String>, request: SampleRequest) {
        self.requests.insert(label.into(), request);
    }

    pub fn get(&self, label: &str) -> SampleRequest {
        self.requests.get(label).copied().unwrap_or(self.fallback)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.requests.keys().map(String::as_str)
    }
}

/// What happened to one label during the split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSplit {
    pub label:     String,
    pub available: usize,
    pub requested: String,
    pub train:     usize,
    pub test:      usize,
}

/// Pick `k` distinct ordinal positions out of `[0, n)`, sorted ascending.
///
/// The caller guarantees `k <= n`.
pub fn select_positions<R: Rng + ?Sized>(n: usize, k: usize, rng: &mut R) -> Vec<usize> {
    debug_assert!(k <= n, "cannot select {k} of {n}");
    if k == 0 {
        return Vec::new();
    }
    if k == n {
        return (0..n).collect();
    }

    let mut permutation: Vec<usize> = (0..n).collect();
    permutation.shuffle(rng);
    permutation.truncate(k);
    permutation.sort_unstable();
    permutation
}

/// Split every bucket of `partition` into the two output streams.
///
/// Buckets are consumed; they cannot be read again afterwards.
pub fn split<R, T, E>(
    partition: Partition,
    counts:    &SampleCounts,
    rng:       &mut R,
    train:     &mut T,
    test:      &mut E,
) -> PipelineResult<Vec<LabelSplit>>
where
    R: Rng + ?Sized,
    T: Write,
    E: Write,
{
    for label in counts.labels() {
        if !partition.contains(label) {
            tracing::warn!("Ignoring request for label '{label}': no records carry it");
        }
    }

    // Validate every label before touching the output streams
    let plan = partition
        .into_buckets()
        .into_iter()
        .map(|bucket| {
            let request = counts.get(bucket.label());
            let k = request.resolve(bucket.label(), bucket.len())?;
            Ok((bucket, request, k))
        })
        .collect::<PipelineResult<Vec<_>>>()?;

    let mut summary = Vec::with_capacity(plan.len());
    for (bucket, request, k) in plan {
        let split = split_bucket(bucket, k, rng, train, test)?;
        summary.push(LabelSplit {
            requested: request.to_string(),
            ..split
        });
    }

    train
        .flush()
        .map_err(|e| PipelineError::resource("cannot flush training stream", e))?;
    test
        .flush()
        .map_err(|e| PipelineError::resource("cannot flush testing stream", e))?;
    Ok(summary)
}

fn split_bucket<R, T, E>(
    bucket: ClassBucket,
    k:      usize,
    rng:    &mut R,
    train:  &mut T,
    test:   &mut E,
) -> PipelineResult<LabelSplit>
where
    R: Rng + ?Sized,
    T: Write,
    E: Write,
{
    let n = bucket.len();
    let selected = select_positions(n, k, rng);
    let reader = bucket.into_reader()?;
    let label = reader.label().to_string();

    let mut cursor = 0usize;
    let mut seen = 0usize;
    for (ordinal, line) in reader.enumerate() {
        let line = line?;
        if selected.get(cursor) == Some(&ordinal) {
            writeln!(train, "{line}")
                .map_err(|e| PipelineError::resource("cannot write training stream", e))?;
            cursor += 1;
        } else {
            writeln!(test, "{line}")
                .map_err(|e| PipelineError::resource("cannot write testing stream", e))?;
        }
        seen += 1;
    }

    if seen != n || cursor != k {
        return Err(PipelineError::resource(
            format!("bucket for label '{label}' changed while sampling"),
            std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("expected {n} record(s), read {seen}"),
            ),
        ));
    }

    tracing::debug!("Label '{}': {} train, {} test of {}", label, k, n - k, n);
    Ok(LabelSplit {
        label,
        available: n,
        requested: k.to_string(),
        train:     k,
        test:      n - k,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::bucket::StorageMode;
    use crate::data::loader::LineReader;
    use crate::data::partitioner::Partitioner;
    use crate::infra::output::AtomicOutput;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;
    use std::io::Cursor;

    fn requests(fallback: SampleRequest, explicit: &[(&str, SampleRequest)]) -> SampleCounts {
        let mut counts = SampleCounts::new(fallback);
        for (label, request) in explicit {
            counts.set(*label, *request);
        }
        counts
    }

    fn partition_of(text: &str) -> Partition {
        Partitioner::new(StorageMode::Memory)
            .partition_reader(LineReader::new(Cursor::new(text.to_string()), "test"), ',')
            .unwrap()
    }

    /// r0..r(n-1) labeled A, then m records labeled B
    fn dataset(n: usize, m: usize) -> String {
        let mut s = String::new();
        for i in 0..n {
            s.push_str(&format!("r{i},A\n"));
        }
        for i in 0..m {
            s.push_str(&format!("s{i},B\n"));
        }
        s
    }

    fn run(text: &str, counts: &SampleCounts, seed: u64) -> PipelineResult<(Vec<String>, Vec<String>, Vec<LabelSplit>)> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut train = Vec::new();
        let mut test = Vec::new();
        let summary = split(partition_of(text), counts, &mut rng, &mut train, &mut test)?;
        let lines = |b: Vec<u8>| -> Vec<String> {
            String::from_utf8(b).unwrap().lines().map(str::to_string).collect()
        };
        Ok((lines(train), lines(test), summary))
    }

    fn ordinals(lines: &[String], prefix: char) -> Vec<usize> {
        lines
            .iter()
            .filter(|l| l.starts_with(prefix))
            .map(|l| l[1..l.find(',').unwrap()].parse().unwrap())
            .collect()
    }

    #[test]
    fn test_exact_count_and_totality() {
        let text = dataset(10, 7);
        for k in 0..=10 {
            let counts = requests(SampleRequest::None, &[("A", SampleRequest::Exact(k))]);
            let (train, test, _) = run(&text, &counts, 42).unwrap();
            let train_a = ordinals(&train, 'r');
            let test_a = ordinals(&test, 'r');
            assert_eq!(train_a.len(), k);
            assert_eq!(train_a.len() + test_a.len(), 10);

            let train_set: HashSet<_> = train_a.iter().collect();
            assert!(test_a.iter().all(|i| !train_set.contains(i)));
            // B defaults to none: all 7 go to test
            assert_eq!(ordinals(&test, 's').len(), 7);
        }
    }

    #[test]
    fn test_streams_preserve_bucket_order() {
        let counts = SampleCounts::new(SampleRequest::Exact(4));
        let (train, test, _) = run(&dataset(12, 9), &counts, 7).unwrap();
        for prefix in ['r', 's'] {
            for stream in [&train, &test] {
                let ords = ordinals(stream, prefix);
                assert!(ords.windows(2).all(|w| w[0] < w[1]), "{ords:?}");
            }
        }
    }

    #[test]
    fn test_same_seed_same_selection() {
        let counts = requests(SampleRequest::None, &[("A", SampleRequest::Exact(3))]);
        let (first, _, _) = run(&dataset(10, 0), &counts, 1234).unwrap();
        let (second, _, _) = run(&dataset(10, 0), &counts, 1234).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_boundaries_none_and_all() {
        let counts = requests(SampleRequest::None, &[("A", SampleRequest::All)]);
        let (train, test, summary) = run(&dataset(5, 4), &counts, 0).unwrap();
        assert_eq!(ordinals(&train, 'r'), vec![0, 1, 2, 3, 4]);
        assert!(ordinals(&train, 's').is_empty());
        assert_eq!(ordinals(&test, 's'), vec![0, 1, 2, 3]);
        assert_eq!(summary[0].requested, "all");
        assert_eq!(summary[1].requested, "none");
        assert_eq!((summary[1].train, summary[1].test), (0, 4));
    }

    #[test]
    fn test_request_larger_than_bucket_is_rejected() {
        let counts = requests(
            SampleRequest::None,
            &[("A", SampleRequest::Exact(2)), ("B", SampleRequest::Exact(5))],
        );
        let mut train = Vec::new();
        let mut test = Vec::new();
        let mut rng = StdRng::seed_from_u64(0);
        let err = split(partition_of(&dataset(3, 4)), &counts, &mut rng, &mut train, &mut test).unwrap_err();
        match err {
            PipelineError::InvalidSampleSize { label, available, requested } => {
                assert_eq!(label, "B");
                assert_eq!(available, 4);
                assert_eq!(requested, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
        // Nothing written, not even for the valid label A
        assert!(train.is_empty());
        assert!(test.is_empty());
    }

    #[test]
    fn test_unknown_labels_are_ignored() {
        let counts = requests(SampleRequest::None, &[("ZZZ", SampleRequest::Exact(100))]);
        let (train, test, summary) = run(&dataset(2, 2), &counts, 0).unwrap();
        assert!(train.is_empty());
        assert_eq!(test.len(), 4);
        assert_eq!(summary.len(), 2);
    }

    #[test]
    fn test_summary_matches_streams() {
        let counts = SampleCounts::new(SampleRequest::Exact(2));
        let (train, test, summary) = run(&dataset(6, 3), &counts, 99).unwrap();
        let total_train: usize = summary.iter().map(|s| s.train).sum();
        let total_test: usize = summary.iter().map(|s| s.test).sum();
        assert_eq!(total_train, train.len());
        assert_eq!(total_test, test.len());
        assert_eq!(summary[0], LabelSplit {
            label:     "A".into(),
            available: 6,
            requested: "2".into(),
            train:     2,
            test:      4,
        });
    }

    #[test]
    fn test_disk_buckets_split_identically() {
        let dir = tempfile::tempdir().unwrap();
        let text = dataset(10, 5);
        let counts = SampleCounts::new(SampleRequest::Exact(3));

        let disk = Partitioner::new(StorageMode::Disk)
            .with_temp_dir(dir.path())
            .partition_reader(LineReader::new(Cursor::new(text.clone()), "test"), ',')
            .unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let (mut train, mut test) = (Vec::new(), Vec::new());
        split(disk, &counts, &mut rng, &mut train, &mut test).unwrap();

        let (mem_train, mem_test, _) = run(&text, &counts, 5).unwrap();
        assert_eq!(String::from_utf8(train).unwrap().lines().collect::<Vec<_>>(), mem_train);
        assert_eq!(String::from_utf8(test).unwrap().lines().collect::<Vec<_>>(), mem_test);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    /// Accepts `remaining` bytes, then fails every write.
    struct FailingWriter {
        remaining: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if buf.len() > self.remaining {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "device full"));
            }
            self.remaining -= buf.len();
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_cleans_up_buckets_and_outputs() {
        let buckets = tempfile::tempdir().unwrap();
        let outputs = tempfile::tempdir().unwrap();
        let partition = Partitioner::new(StorageMode::Disk)
            .with_temp_dir(buckets.path())
            .partition_reader(LineReader::new(Cursor::new(dataset(20, 20)), "test"), ',')
            .unwrap();
        assert_eq!(std::fs::read_dir(buckets.path()).unwrap().count(), 2);

        let counts = SampleCounts::new(SampleRequest::Exact(10));
        let mut rng = StdRng::seed_from_u64(8);
        let mut train = FailingWriter { remaining: 16 };
        let mut test = AtomicOutput::create(outputs.path().join("data.test")).unwrap();

        let err = split(partition, &counts, &mut rng, &mut train, &mut test).unwrap_err();
        assert!(err.to_string().contains("cannot write training stream"), "{err}");
        drop(test);

        assert_eq!(std::fs::read_dir(buckets.path()).unwrap().count(), 0);
        assert_eq!(std::fs::read_dir(outputs.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_select_positions_is_sorted_and_distinct() {
        let mut rng = StdRng::seed_from_u64(3);
        for (n, k) in [(10, 3), (100, 50), (1, 1), (5, 0), (8, 8)] {
            let picked = select_positions(n, k, &mut rng);
            assert_eq!(picked.len(), k);
            assert!(picked.windows(2).all(|w| w[0] < w[1]));
            assert!(picked.iter().all(|&p| p < n));
        }
    }

    #[test]
    fn test_selection_covers_every_position() {
        // Over many draws every ordinal should get picked at least once
        let mut rng = StdRng::seed_from_u64(11);
        let mut hits = [0usize; 10];
        for _ in 0..500 {
            for p in select_positions(10, 3, &mut rng) {
                hits[p] += 1;
            }
        }
        assert!(hits.iter().all(|&h| h > 0), "{hits:?}");
    }
}
