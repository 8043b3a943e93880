// ============================================================
// Layer 4 — Feature Editor
// ============================================================
// Removes selected columns from every record of a dataset.
//
// Column selections are written as indices and inclusive
// ranges, for example:
//
//   "1,3-5"  → columns {1, 3, 4, 5}
//
// A selection is kept as sorted, non-overlapping inclusive
// spans, so "0-4000000000" costs one span, not four billion
// entries. Overlapping and adjacent spans are merged:
//
//   "4-6,1,2,5-9"  → [1..=2, 4..=9]
//
// Records narrower than a selected index simply have nothing
// to remove at that position.
//
// Reference: Rust Book §8 (Vectors), std::ops::RangeInclusive

use std::{
    fmt,
    io::{BufRead, Write},
    ops::RangeInclusive,
    str::FromStr,
};

use crate::data::loader::LineReader;
use crate::domain::error::{PipelineError, PipelineResult};

/// A set of zero-based column indices, as sorted disjoint spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSelection(Vec<RangeInclusive<usize>>);

impl ColumnSelection {
    /// Sort `spans` and merge any that overlap or touch.
    fn from_spans(mut spans: Vec<RangeInclusive<usize>>) -> Self {
        spans.sort_by_key(|span| *span.start());
        let mut merged: Vec<RangeInclusive<usize>> = Vec::with_capacity(spans.len());
        for span in spans {
            match merged.last_mut() {
                Some(last) if *span.start() <= last.end().saturating_add(1) => {
                    let end = (*last.end()).max(*span.end());
                    *last = *last.start()..=end;
                }
                _ => merged.push(span),
            }
        }
        Self(merged)
    }

    pub fn contains(&self, column: usize) -> bool {
        let i = self.0.partition_point(|span| *span.end() < column);
        self.0.get(i).is_some_and(|span| *span.start() <= column)
    }

    /// Keep only the fields of `line` that are not selected.
    pub fn drop_from(&self, line: &str, delimiter: char) -> String {
        let mut out = String::with_capacity(line.len());
        let kept = line
            .split(delimiter)
            .enumerate()
            .filter(|(i, _)| !self.contains(*i))
            .map(|(_, field)| field);
        for (n, field) in kept.enumerate() {
            if n > 0 {
                out.push(delimiter);
            }
            out.push_str(field);
        }
        out
    }
}

impl FromStr for ColumnSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |t: &str| {
            t.trim()
                .parse::<usize>()
                .map_err(|_| format!("'{}' is not a column index", t.trim()))
        };

        let mut spans = Vec::new();
        for part in s.split(',').filter(|p| !p.trim().is_empty()) {
            match part.split_once('-') {
                Some((start, end)) => {
                    let (start, end) = (parse(start)?, parse(end)?);
                    if start > end {
                        return Err(format!("range {start}-{end} runs backwards"));
                    }
                    spans.push(start..=end);
                }
                None => {
                    let column = parse(part)?;
                    spans.push(column..=column);
                }
            }
        }

        if spans.is_empty() {
            return Err("no columns selected".into());
        }
        Ok(Self::from_spans(spans))
    }
}

impl fmt::Display for ColumnSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|span| match (span.start(), span.end()) {
                (start, end) if start == end => start.to_string(),
                (start, end) => format!("{start}-{end}"),
            })
            .collect();
        write!(f, "{}", parts.join(","))
    }
}

/// Re-emit every line of `input` without the selected columns.
/// Returns the number of lines written.
pub fn drop_columns<R: BufRead, W: Write>(
    input:     R,
    output:    &mut W,
    selection: &ColumnSelection,
    delimiter: char,
) -> PipelineResult<usize> {
    let mut written = 0usize;
    for line in LineReader::new(input, "dataset") {
        let (_, line) = line?;
        if line.trim().is_empty() {
            continue;
        }
        writeln!(output, "{}", selection.drop_from(&line, delimiter))
            .map_err(|e| PipelineError::resource("cannot write edited record", e))?;
        written += 1;
    }
    output
        .flush()
        .map_err(|e| PipelineError::resource("cannot flush edited output", e))?;

    tracing::info!("Dropped column(s) {selection} from {written} record(s)");
    Ok(written)
}
