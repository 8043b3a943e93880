// ============================================================
// Layer 4 — Labeler
// ============================================================
// Assigns a class label to every record of a raw dataset using
// a RuleTable, and appends that label as a new last field.
//
//   raw line  ──► Record ──► RuleTable::lookup ──► LabeledRecord
//                                 │
//                                 └── no match → default label ("OTHER")
//
// Malformed records:
//   A record with fewer fields than the rules need is skipped,
//   not labeled and not emitted. The skip is logged and counted
//   in the LabelReport so the caller can audit the input.
//   The required width is (highest rule feature index + 1),
//   unless an explicit minimum is configured.
//
// Blank lines are not records and are ignored silently.
//
// Labels are appended as the last field, and the partitioner
// reads them back from there. A rule or default label that is
// empty or contains the delimiter or a line break would not
// survive that round trip, so it is rejected before the first
// record is labeled.
//
// The Labeler holds no mutable state: labeling the same record
// twice always gives the same answer.
//
// Reference: Rust Book §13 (Iterators and Closures)

use std::{
    collections::BTreeMap,
    io::{BufRead, Write},
};

use crate::data::loader::LineReader;
use crate::data::rule_table::RuleTable;
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::record::{LabeledRecord, Record};

/// Label used when no rule matches
pub const DEFAULT_LABEL: &str = "OTHER";

/// How many skipped line numbers the report keeps for display
const SKIPPED_LINES_KEPT: usize = 10;

/// Outcome of a labeling pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelReport {
    /// Records labeled and emitted
    pub labeled: usize,

    /// Records skipped as malformed
    pub skipped: usize,

    /// First few line numbers that were skipped
    pub skipped_lines: Vec<usize>,

    /// Emitted records per label
    pub per_label: BTreeMap<String, usize>,
}

impl LabelReport {
    fn record_skip(&mut self, err: &PipelineError) {
        tracing::debug!("Skipping record: {err}");
        self.skipped += 1;
        if let PipelineError::MalformedRecord { line, .. } = err {
            if self.skipped_lines.len() < SKIPPED_LINES_KEPT {
                self.skipped_lines.push(*line);
            }
        }
    }

    fn record_label(&mut self, label: &str) {
        self.labeled += 1;
        *self.per_label.entry(label.to_string()).or_insert(0) += 1;
    }
}

pub struct Labeler<'a> {
    rules:         &'a RuleTable,
    delimiter:     char,
    default_label: String,
    min_fields:    usize,
}

impl<'a> Labeler<'a> {
    /// Build a labeler with the default label and a record width
    /// derived from the rules.
    pub fn new(rules: &'a RuleTable) -> Self {
        Self {
            rules,
            delimiter:     ',',
            default_label: DEFAULT_LABEL.to_string(),
            min_fields:    rules.required_fields(),
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_default_label(mut self, label: impl Into<String>) -> Self {
        self.default_label = label.into();
        self
    }

    /// Override the minimum number of fields a record must have.
    pub fn with_min_fields(mut self, min_fields: usize) -> Self {
        self.min_fields = min_fields;
        self
    }

    pub fn min_fields(&self) -> usize {
        self.min_fields
    }

    /// Check that every label this labeler can emit is a single,
    /// non-empty field under the configured delimiter.
    pub fn check_labels(&self) -> PipelineResult<()> {
        let delimiter = self.delimiter;
        for label in self.rules.labels().chain([self.default_label.as_str()]) {
            let reason = if label.is_empty() {
                "labels cannot be empty".to_string()
            } else if label.contains(delimiter) {
                format!("labels cannot contain the record delimiter {delimiter:?}")
            } else if label.contains(['\n', '\r']) {
                "labels cannot contain line breaks".to_string()
            } else {
                continue;
            };
            return Err(PipelineError::InvalidLabel {
                label: label.to_string(),
                reason,
            });
        }
        Ok(())
    }

    /// Label a single record.
    ///
    /// Returns `MalformedRecord` when the record is too narrow; callers
    /// are expected to skip it rather than abort.
    pub fn label(&self, record: &Record) -> PipelineResult<&str> {
        if record.field_count() < self.min_fields {
            return Err(PipelineError::MalformedRecord {
                line:     record.line_no,
                fields:   record.field_count(),
                required: self.min_fields,
            });
        }
        Ok(self
            .rules
            .lookup(record)
            .unwrap_or(self.default_label.as_str()))
    }

    /// Turn numbered raw lines into labeled records, skipping blank and
    /// malformed lines. Skips are tallied into `report`; I/O errors and
    /// a failed label check are passed through for the caller to abort on.
    /// The label check comes first, ahead of any record.
    pub fn label_lines<'r, I>(
        &'r self,
        lines:  I,
        report: &'r mut LabelReport,
    ) -> impl Iterator<Item = PipelineResult<LabeledRecord>> + 'r
    where
        I: IntoIterator<Item = PipelineResult<(usize, String)>>,
        I::IntoIter: 'r,
    {
        let invalid = self.check_labels().err().map(Err);
        invalid.into_iter().chain(lines.into_iter().filter_map(move |line| {
            let (line_no, line) = match line {
                Ok(l) => l,
                Err(e) => return Some(Err(e)),
            };
            if line.trim().is_empty() {
                return None;
            }

            let record = Record::parse(line_no, line, self.delimiter);
            match self.label(&record) {
                Ok(label) => {
                    let label = label.to_string();
                    report.record_label(&label);
                    Some(Ok(record.with_label(label, self.delimiter)))
                }
                Err(e) => {
                    report.record_skip(&e);
                    None
                }
            }
        }))
    }

    /// Label a whole dataset stream, writing one labeled line per
    /// accepted input line.
    pub fn label_stream<R: BufRead, W: Write>(
        &self,
        input:  R,
        output: &mut W,
    ) -> PipelineResult<LabelReport> {
        let mut report = LabelReport::default();

        for labeled in self.label_lines(LineReader::new(input, "dataset"), &mut report) {
            let labeled = labeled?;
            writeln!(output, "{}", labeled.line)
                .map_err(|e| PipelineError::resource("cannot write labeled record", e))?;
        }
        output
            .flush()
            .map_err(|e| PipelineError::resource("cannot flush labeled output", e))?;

        if report.skipped > 0 {
            tracing::warn!(
                "Skipped {} malformed record(s) with fewer than {} field(s)",
                report.skipped,
                self.min_fields
            );
        }
        tracing::info!("Labeled {} record(s)", report.labeled);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn rules(text: &str) -> RuleTable {
        RuleTable::from_reader(Cursor::new(text.to_string())).unwrap()
    }

    fn run(labeler: &Labeler, data: &str) -> (String, LabelReport) {
        let mut out = Vec::new();
        let report = labeler
            .label_stream(Cursor::new(data.to_string()), &mut out)
            .unwrap();
        (String::from_utf8(out).unwrap(), report)
    }

    #[test]
    fn test_reference_scenario() {
        let t = rules("0 1 A\n2 5 B\n");
        let labeler = Labeler::new(&t);
        let (out, report) = run(&labeler, "1,x,x,x,x\n5,x,x,x,x\n9,x,x,x,x\n");
        assert_eq!(out, "1,x,x,x,x,A\n5,x,x,x,x,OTHER\n9,x,x,x,x,OTHER\n");
        assert_eq!(report.labeled, 3);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.per_label.get("A"), Some(&1));
        assert_eq!(report.per_label.get("OTHER"), Some(&2));
    }

    #[test]
    fn test_narrow_records_are_skipped_and_counted() {
        let t = rules("3 1 A\n");
        let labeler = Labeler::new(&t);
        let (out, report) = run(&labeler, "0,0,0,1\n0,0\n0,0,0,2\n");
        assert_eq!(out, "0,0,0,1,A\n0,0,0,2,OTHER\n");
        assert_eq!(report.skipped, 1);
        assert_eq!(report.skipped_lines, vec![2]);
    }

    #[test]
    fn test_processing_continues_after_a_skip() {
        // A malformed line in the middle must not end the run
        let t = rules("1 1 A\n");
        let labeler = Labeler::new(&t);
        let (out, report) = run(&labeler, "0\n1,1\n");
        assert_eq!(out, "1,1,A\n");
        assert_eq!(report.labeled, 1);
    }

    #[test]
    fn test_min_fields_override() {
        let t = rules("0 1 A\n");
        let labeler = Labeler::new(&t).with_min_fields(5);
        let (out, report) = run(&labeler, "1,x,x,x,x\n1,x\n");
        assert_eq!(out, "1,x,x,x,x,A\n");
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        let t = rules("0 1 A\n");
        let labeler = Labeler::new(&t);
        let (out, report) = run(&labeler, "1,x\n\n1,y\n");
        assert_eq!(out, "1,x,A\n1,y,A\n");
        assert_eq!(report.skipped, 0);
    }

    #[test]
    fn test_custom_delimiter_and_default_label() {
        let t = rules("0 1 A\n");
        let labeler = Labeler::new(&t)
            .with_delimiter(';')
            .with_default_label("NORMAL");
        let (out, _) = run(&labeler, "1;x\n2;x\n");
        assert_eq!(out, "1;x;A\n2;x;NORMAL\n");
    }

    #[test]
    fn test_label_is_idempotent() {
        let t = rules("0 1 A\n2 5 B\n");
        let labeler = Labeler::new(&t);
        let r = Record::parse(1, "9,x,5,x,x", ',');
        assert_eq!(labeler.label(&r).unwrap(), "B");
        assert_eq!(labeler.label(&r).unwrap(), "B");
    }

    #[test]
    fn test_rule_label_containing_delimiter_is_rejected() {
        let t = rules("0 1 A,B\n");
        let mut out = Vec::new();
        let err = Labeler::new(&t)
            .label_stream(Cursor::new("1,x\n2,y\n"), &mut out)
            .unwrap_err();
        match err {
            PipelineError::InvalidLabel { label, .. } => assert_eq!(label, "A,B"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(out.is_empty());

        // The same rule is fine once the delimiter changes
        let labeler = Labeler::new(&t).with_delimiter(';');
        let (out, _) = run(&labeler, "1;x\n");
        assert_eq!(out, "1;x;A,B\n");
    }

    #[test]
    fn test_default_label_is_checked() {
        let t = rules("0 1 A\n");
        for bad in ["NOT;OK", "", "TWO\nLINES"] {
            let labeler = Labeler::new(&t).with_delimiter(';').with_default_label(bad);
            assert!(matches!(
                labeler.check_labels(),
                Err(PipelineError::InvalidLabel { .. })
            ));
        }
        assert!(Labeler::new(&t).with_default_label("NORMAL").check_labels().is_ok());
    }

    #[test]
    fn test_label_lines_yields_records() {
        let t = rules("0 1 A\n");
        let labeler = Labeler::new(&t);
        let mut report = LabelReport::default();
        let lines = vec![Ok((1, "1,a".to_string())), Ok((2, "2,b".to_string()))];
        let labeled: Vec<_> = labeler
            .label_lines(lines, &mut report)
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(labeled[0].label, "A");
        assert_eq!(labeled[1].label, "OTHER");
        assert_eq!(labeled[1].line_no, 2);
        assert_eq!(report.labeled, 2);
    }
}
