// ============================================================
// Layer 4 — Rule Table
// ============================================================
// Parses a rule file into a lookup table:
//
//   feature index → (match value → label)
//
// Rule file grammar, one rule per non-blank line:
//
//   <idx>[,<idx>...]  <value>  <label>
//
//   # Comment lines start with '#'
//   0       1   A        → if column 0 == 1 then label A
//   2,3     5   B        → if column 2 == 5 or column 3 == 5 then B
//
// A line listing several feature indices expands into one rule
// per index, all sharing the same value and label. A repeated
// (index, value) pair overwrites the earlier label.
//
// Lookup order:
//   Feature indices are visited in ascending order, and the
//   first one whose value matches wins. The BTreeMap gives us
//   that ordering for free.
//
// Reference: Rust Book §8 (Hash Maps)
//            std::collections::BTreeMap documentation

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::data::loader::LineReader;
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::record::Record;

/// Immutable rule lookup table, built once per labeling run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    rules: BTreeMap<usize, HashMap<i64, String>>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse a rule file from disk.
    pub fn load(path: &Path) -> PipelineResult<Self> {
        let file = File::open(path).map_err(|e| {
            PipelineError::resource(format!("cannot open rule file '{}'", path.display()), e)
        })?;
        let table = Self::from_reader(BufReader::new(file))?;
        tracing::debug!(
            "Loaded {} rule(s) over {} feature(s) from '{}'",
            table.len(),
            table.feature_count(),
            path.display()
        );
        Ok(table)
    }

    /// Parse rules from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> PipelineResult<Self> {
        let mut table = Self::new();

        for line in LineReader::new(reader, "rules") {
            let (line_no, line) = line?;
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            if fields.len() != 3 {
                return Err(PipelineError::MalformedRule {
                    line:   line_no,
                    reason: format!("expected 3 fields, found {}", fields.len()),
                });
            }

            let value: i64 = fields[1].parse().map_err(|_| PipelineError::MalformedRule {
                line:   line_no,
                reason: format!("match value '{}' is not an integer", fields[1]),
            })?;
            let label = fields[2];

            for token in fields[0].split(',') {
                let feature: usize =
                    token.trim().parse().map_err(|_| PipelineError::MalformedRule {
                        line:   line_no,
                        reason: format!("feature index '{token}' is not a non-negative integer"),
                    })?;
                tracing::debug!("Rule: if feature[{feature}] == {value} then {label}");
                table.insert(feature, value, label);
            }
        }

        Ok(table)
    }

    /// Add one rule, replacing any label already set for the same pair.
    pub fn insert(&mut self, feature: usize, value: i64, label: impl Into<String>) {
        self.rules
            .entry(feature)
            .or_default()
            .insert(value, label.into());
    }

    /// First label whose rule matches the record, scanning feature
    /// indices in ascending order. Fields that are missing or are not
    /// integers never match.
    pub fn lookup(&self, record: &Record) -> Option<&str> {
        self.rules.iter().find_map(|(&feature, values)| {
            let value: i64 = record.field(feature)?.trim().parse().ok()?;
            values.get(&value).map(String::as_str)
        })
    }

    /// Every distinct label a rule can assign
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rules
            .values()
            .flat_map(HashMap::values)
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
    }

    /// Highest feature index referenced by any rule
    pub fn max_feature_index(&self) -> Option<usize> {
        self.rules.keys().next_back().copied()
    }

    /// Minimum field count a record needs for every rule to be checkable
    pub fn required_fields(&self) -> usize {
        self.max_feature_index().map_or(0, |i| i + 1)
    }

    /// Total number of (feature, value) rules
    pub fn len(&self) -> usize {
        self.rules.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of distinct feature indices with at least one rule
    pub fn feature_count(&self) -> usize {
        self.rules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn table(text: &str) -> RuleTable {
        RuleTable::from_reader(Cursor::new(text.to_string())).unwrap()
    }

    fn record(line: &str) -> Record {
        Record::parse(1, line, ',')
    }

    #[test]
    fn test_parses_simple_rules() {
        let t = table("0 1 A\n2 5 B\n");
        assert_eq!(t.len(), 2);
        assert_eq!(t.feature_count(), 2);
        assert_eq!(t.max_feature_index(), Some(2));
        assert_eq!(t.required_fields(), 3);
    }

    #[test]
    fn test_skips_comments_and_blank_lines() {
        let t = table("# header comment\n\n   \n  # indented comment\n0 1 A\n");
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_index_list_expands_to_one_rule_per_feature() {
        let t = table("1,3,4\t7\tDOS\n");
        assert_eq!(t.len(), 3);
        assert_eq!(t.lookup(&record("0,0,0,7,0")), Some("DOS"));
        assert_eq!(t.lookup(&record("0,7,0,0,0")), Some("DOS"));
        assert_eq!(t.lookup(&record("7,0,0,0,0")), None);
    }

    #[test]
    fn test_duplicate_pair_last_write_wins() {
        let t = table("0 1 A\n0 1 B\n");
        assert_eq!(t.len(), 1);
        assert_eq!(t.lookup(&record("1,x")), Some("B"));
    }

    #[test]
    fn test_wrong_field_count_is_fatal() {
        let err = RuleTable::from_reader(Cursor::new("0 1 A\n0 1\n")).unwrap_err();
        match err {
            PipelineError::MalformedRule { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
        assert!(RuleTable::from_reader(Cursor::new("0 1 A extra\n")).is_err());
    }

    #[test]
    fn test_non_integer_index_or_value_is_fatal() {
        assert!(RuleTable::from_reader(Cursor::new("x 1 A\n")).is_err());
        assert!(RuleTable::from_reader(Cursor::new("-1 1 A\n")).is_err());
        assert!(RuleTable::from_reader(Cursor::new("0,,2 1 A\n")).is_err());
        assert!(RuleTable::from_reader(Cursor::new("0 one A\n")).is_err());
    }

    #[test]
    fn test_lowest_feature_index_wins() {
        // Both rules match "1,x,5"; feature 0 is checked first
        let t = table("2 5 B\n0 1 A\n");
        assert_eq!(t.lookup(&record("1,x,5")), Some("A"));
        assert_eq!(t.lookup(&record("9,x,5")), Some("B"));
    }

    #[test]
    fn test_non_integer_field_does_not_match() {
        let t = table("2 5 B\n");
        assert_eq!(t.lookup(&record("5,x,x,x,x")), None);
        assert_eq!(t.lookup(&record("5,x, 5 ,x,x")), Some("B"));
    }

    #[test]
    fn test_lookup_is_repeatable() {
        let t = table("0 1 A\n");
        let r = record("1,x,x,x,x");
        assert_eq!(t.lookup(&r), t.lookup(&r));
    }

    #[test]
    fn test_labels_are_distinct() {
        let t = table("0 1 A\n1,2 3 B\n4 4 A\n");
        assert_eq!(t.labels().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_negative_match_values() {
        let t = table("0 -3 NEG\n");
        assert_eq!(t.lookup(&record("-3,x")), Some("NEG"));
    }
}
