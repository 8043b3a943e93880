// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between a raw dataset file and the final
// training / testing files.
//
// The pipeline flows in this order:
//
//   rule file ──► RuleTable
//                    │
//   raw dataset ─────┼──► Labeler        → labeled stream
//                                              │
//                                              ▼
//                                       Partitioner → one ClassBucket per label
//                                              │
//                                              ▼
//                                       Sampler     → train stream + test stream
//
// Side tools that share the same line handling:
//   arff            — ARFF → plain delimited rows
//   feature_editor  — drop columns from every record
//
// Each module does exactly one step and is tested on its own.
//
// Reference: Rust Book §7 (Modules), §13 (Iterators)

/// Numbered line reading shared by every source
pub mod loader;

/// Rule file parsing and lookup
pub mod rule_table;

/// Rule-based record labeling
pub mod labeler;

/// Per-label record stores (memory or temporary file)
pub mod bucket;

/// Groups a labeled stream into buckets
pub mod partitioner;

/// Exact-count stratified train/test split
pub mod sampler;

/// ARFF header reading and data extraction
pub mod arff;

/// Column removal
pub mod feature_editor;
