// ============================================================
// Layer 3 — Pipeline Error Taxonomy
// ============================================================
// Every failure the labeling and splitting pipeline can report.
//
//   MalformedRule      — a rule line breaks the 3-field grammar,
//                        or an index / value is not an integer.
//                        Fatal: labeling never starts.
//   MalformedRecord    — a dataset line has too few fields.
//                        Recovered locally: the record is skipped
//                        and counted in the LabelReport.
//   InvalidLabel       — a rule or default label cannot be written
//                        as the last field of a record.
//                        Fatal: labeling never starts.
//   InvalidSampleSize  — a training request is outside [0, n].
//                        Fatal for the whole split.
//   MalformedHeader    — an ARFF header line cannot be read.
//   Resource           — any I/O failure on a source, bucket
//                        store, or output stream. Fatal.
//
// The data layer returns these directly. The application and
// CLI layers wrap them in anyhow with file context.
//
// Reference: thiserror crate documentation
//            Rust Book §9 (Recoverable Errors with Result)

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("malformed rule on line {line}: {reason}")]
    MalformedRule { line: usize, reason: String },

    #[error("malformed record on line {line}: {fields} field(s), at least {required} required")]
    MalformedRecord {
        line:     usize,
        fields:   usize,
        required: usize,
    },

    #[error("invalid label '{label}': {reason}")]
    InvalidLabel { label: String, reason: String },

    #[error("invalid sample size for label '{label}': requested {requested}, {available} available")]
    InvalidSampleSize {
        label:     String,
        available: usize,
        requested: usize,
    },

    #[error("malformed ARFF header on line {line}: {reason}")]
    MalformedHeader { line: usize, reason: String },

    #[error("{context}: {source}")]
    Resource {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    /// Wrap an I/O error with a short description of what was being done
    pub fn resource(context: impl Into<String>, source: io::Error) -> Self {
        Self::Resource {
            context: context.into(),
            source,
        }
    }
}

/// Shorthand used throughout the data layer
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let e = PipelineError::InvalidSampleSize {
            label:     "A".into(),
            available: 3,
            requested: 7,
        };
        let msg = e.to_string();
        assert!(msg.contains("'A'"));
        assert!(msg.contains("requested 7"));
        assert!(msg.contains("3 available"));

        let e = PipelineError::MalformedRule { line: 4, reason: "expected 3 fields".into() };
        assert_eq!(e.to_string(), "malformed rule on line 4: expected 3 fields");
    }

    #[test]
    fn test_resource_keeps_source() {
        use std::error::Error as _;
        let e = PipelineError::resource(
            "reading bucket",
            io::Error::new(io::ErrorKind::UnexpectedEof, "eof"),
        );
        assert!(e.source().is_some());
        assert!(e.to_string().starts_with("reading bucket"));
    }
}
