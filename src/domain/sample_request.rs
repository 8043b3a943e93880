// ============================================================
// Layer 3 — Training-Set Size Request
// ============================================================
// How many records of one label should go to the training set.
//
//   None       → every record goes to the test set
//   All        → every record goes to the training set
//   Exact(k)   → exactly k records, chosen at random
//
// The legacy "-1 for no bias" console input is accepted and
// read as All. Any other negative number is a parse error;
// InvalidSampleSize is only for counts larger than a bucket.
//
// Reference: Rust Book §6 (Enums and Pattern Matching)

use std::fmt;
use std::str::FromStr;

use crate::domain::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleRequest {
    #[default]
    None,
    All,
    Exact(usize),
}

impl SampleRequest {
    /// Resolve the request against a bucket of `available` records.
    /// Fails if an exact request asks for more than the bucket holds.
    pub fn resolve(self, label: &str, available: usize) -> PipelineResult<usize> {
        match self {
            SampleRequest::None => Ok(0),
            SampleRequest::All => Ok(available),
            SampleRequest::Exact(k) if k <= available => Ok(k),
            SampleRequest::Exact(k) => Err(PipelineError::InvalidSampleSize {
                label:     label.to_string(),
                available,
                requested: k,
            }),
        }
    }
}

impl fmt::Display for SampleRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleRequest::None => write!(f, "none"),
            SampleRequest::All => write!(f, "all"),
            SampleRequest::Exact(k) => write!(f, "{k}"),
        }
    }
}

impl FromStr for SampleRequest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "none" => return Ok(SampleRequest::None),
            "all" | "-1" => return Ok(SampleRequest::All),
            _ => {}
        }
        let k: i64 = s
            .parse()
            .map_err(|_| format!("'{s}' is not 'all', 'none' or a count"))?;
        match k {
            0 => Ok(SampleRequest::None),
            k if k > 0 => Ok(SampleRequest::Exact(k as usize)),
            k => Err(format!("negative count {k} (use -1 or 'all' for everything)")),
        }
    }
}
