// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the data and infrastructure layers
// to carry out one command from start to finish.
//
// Rules for this layer:
//   - No parsing or sampling logic here (that's Layer 4)
//   - No printing or prompting here (that's Layer 1)
//   - Only workflow coordination and file handling
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Rule-based labeling of a raw dataset
pub mod label_use_case;

// Stratified train/test split of a labeled dataset
pub mod split_use_case;

// ARFF → delimited rows
pub mod convert_use_case;

// Column removal
pub mod edit_use_case;
