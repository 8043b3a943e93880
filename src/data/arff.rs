// ============================================================
// Layer 4 — ARFF Converter
// ============================================================
// Reads a Weka ARFF file and re-emits its @data section as
// plain delimited lines, the format the labeler and sampler
// consume.
//
// ARFF layout:
//
//   % comment
//   @relation kddcup
//   @attribute duration numeric
//   @attribute protocol {tcp,udp,icmp}
//   ...
//   @data
//   0,tcp,...
//   2,udp,...
//
// Keywords are case-insensitive. The header is parsed only to
// report the relation name and attribute list; data rows are
// copied through unchanged apart from skipping blank lines and
// '%' comments.
//
// Reference: Weka ARFF format documentation

use std::io::{BufRead, Write};

use crate::data::loader::LineReader;
use crate::domain::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArffAttribute {
    pub name: String,
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArffHeader {
    pub relation:   Option<String>,
    pub attributes: Vec<ArffAttribute>,
}

/// Header plus the number of data rows written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArffConversion {
    pub header: ArffHeader,
    pub rows:   usize,
}

/// Parse header lines up to and including `@data`.
pub fn read_header<R: BufRead>(lines: &mut LineReader<R>) -> PipelineResult<ArffHeader> {
    let mut header = ArffHeader::default();

    for line in lines.by_ref() {
        let (line_no, line) = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }

        let mut tokens = trimmed.split_whitespace();
        let keyword = tokens.next().unwrap_or_default().to_ascii_lowercase();
        match keyword.as_str() {
            "@data" => {
                tracing::debug!("Read {} ARFF attribute(s)", header.attributes.len());
                return Ok(header);
            }
            "@relation" => {
                let name = tokens.next().ok_or_else(|| PipelineError::MalformedHeader {
                    line:   line_no,
                    reason: "@relation without a name".into(),
                })?;
                if let Some(first) = &header.relation {
                    return Err(PipelineError::MalformedHeader {
                        line:   line_no,
                        reason: format!("relation declared twice ('{first}' then '{name}')"),
                    });
                }
                header.relation = Some(unquote(name).to_string());
            }
            "@attribute" => {
                let name = tokens.next();
                let kind: Vec<&str> = tokens.collect();
                match name {
                    Some(name) if !kind.is_empty() => header.attributes.push(ArffAttribute {
                        name: unquote(name).to_string(),
                        kind: kind.join(" "),
                    }),
                    _ => {
                        return Err(PipelineError::MalformedHeader {
                            line:   line_no,
                            reason: format!("expected '@attribute <name> <type>', got '{trimmed}'"),
                        })
                    }
                }
            }
            _ => tracing::debug!("Ignoring ARFF header line {line_no}: {trimmed}"),
        }
    }

    Err(PipelineError::MalformedHeader {
        line:   lines.line_no(),
        reason: "no @data section found".into(),
    })
}

/// Convert a whole ARFF stream, writing its data rows to `output`.
pub fn convert<R: BufRead, W: Write>(input: R, output: &mut W) -> PipelineResult<ArffConversion> {
    let mut lines = LineReader::new(input, "arff");
    let header = read_header(&mut lines)?;

    let mut rows = 0usize;
    for line in lines {
        let (_, line) = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }
        writeln!(output, "{trimmed}")
            .map_err(|e| PipelineError::resource("cannot write converted row", e))?;
        rows += 1;
    }
    output
        .flush()
        .map_err(|e| PipelineError::resource("cannot flush converted output", e))?;

    Ok(ArffConversion { header, rows })
}

fn unquote(s: &str) -> &str {
    s.trim_matches(|c| c == '\'' || c == '"')
}
