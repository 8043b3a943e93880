// ============================================================
// Layer 4 — Line Loader
// ============================================================
// Reads a line-oriented text source one line at a time and
// yields (line_number, line) pairs.
//
// Every source in this tool (rule files, datasets, labeled
// datasets, bucket stores, ARFF files) goes through here, so
// line numbering and terminator handling are the same
// everywhere:
//   - line numbers are 1-based
//   - "\n" and a preceding "\r" are stripped
//   - the last line is returned even without a trailing "\n"
//   - bytes that are not UTF-8 are replaced with U+FFFD and
//     the line is still returned, with a warning
//
// The reader is passed in explicitly. There is no shared
// global reader; each caller owns its own source.
//
// Reference: Rust Book §12 (Reading a File)
//            std::io::BufRead documentation

use std::{
    borrow::Cow,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::domain::error::{PipelineError, PipelineResult};

/// Iterator over the lines of a buffered reader, with line numbers.
pub struct LineReader<R> {
    inner:   R,
    line_no: usize,
    /// Human-readable name used in error messages
    source:  String,
    buf:     Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R, source: impl Into<String>) -> Self {
        Self {
            inner,
            line_no: 0,
            source:  source.into(),
            buf:     Vec::new(),
        }
    }

    /// Number of lines read so far
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

impl LineReader<BufReader<File>> {
    /// Open a file for line-by-line reading.
    pub fn open(path: &Path) -> PipelineResult<Self> {
        let file = File::open(path).map_err(|e| {
            PipelineError::resource(format!("cannot open '{}'", path.display()), e)
        })?;
        Ok(Self::new(BufReader::new(file), path.display().to_string()))
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = PipelineResult<(usize, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.inner.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                self.line_no += 1;
                let line = self.buf.strip_suffix(b"\n").unwrap_or(&self.buf);
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                let line = match String::from_utf8_lossy(line) {
                    Cow::Borrowed(text) => text.to_string(),
                    Cow::Owned(text) => {
                        tracing::warn!(
                            "Line {} of '{}' is not valid UTF-8; invalid bytes replaced",
                            self.line_no,
                            self.source
                        );
                        text
                    }
                };
                Some(Ok((self.line_no, line)))
            }
            Err(e) => Some(Err(PipelineError::resource(
                format!("cannot read line {} of '{}'", self.line_no + 1, self.source),
                e,
            ))),
        }
    }
}
