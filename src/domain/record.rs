// ============================================================
// Layer 3 — Record Domain Types
// ============================================================
// A Record is one delimited line of the dataset, split into
// its ordered field values. A LabeledRecord is the same line
// with a class label appended as a final field.
//
// Both keep the 1-based source line number so that skipped or
// rejected lines can be reported back to the user.
//
// Example (delimiter ','):
//   raw line:        "1,x,x,x,x"
//   Record.fields:   ["1", "x", "x", "x", "x"]
//   LabeledRecord:   "1,x,x,x,x,A"   (label "A")
//
// Reference: Rust Book §5 (Structs), §8 (Strings)

/// One parsed line of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 1-based line number in the source
    pub line_no: usize,

    /// The line exactly as read, without its terminator
    pub raw: String,

    /// The line split on the delimiter
    pub fields: Vec<String>,
}

impl Record {
    /// Split `raw` on `delimiter` into fields.
    pub fn parse(line_no: usize, raw: impl Into<String>, delimiter: char) -> Self {
        let raw: String = raw.into();
        let fields = raw.split(delimiter).map(str::to_string).collect();
        Self { line_no, raw, fields }
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// The field at `index`, if the record is wide enough
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Attach a label, producing the serialised labeled line.
    pub fn with_label(self, label: impl Into<String>, delimiter: char) -> LabeledRecord {
        let label = label.into();
        let mut line = self.raw;
        line.push(delimiter);
        line.push_str(&label);
        LabeledRecord {
            line_no: self.line_no,
            line,
            label,
        }
    }
}

/// A record with its class label appended as the last field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledRecord {
    pub line_no: usize,

    /// Full serialised line, label included
    pub line: String,

    pub label: String,
}

impl LabeledRecord {
    /// Read a line that already carries its label as the final field.
    /// A line without any delimiter is treated as a bare label.
    pub fn from_labeled_line(line_no: usize, line: impl Into<String>, delimiter: char) -> Self {
        let line: String = line.into();
        let label = match line.rsplit_once(delimiter) {
            Some((_, label)) => label.to_string(),
            None => line.clone(),
        };
        Self { line_no, line, label }
    }
}
