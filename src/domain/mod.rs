// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that define the concepts of the pipeline:
// records, labeled records, training-size requests and the
// error taxonomy.
//
// Rules for this layer:
//   - NO file I/O
//   - NO randomness
//   - Only plain structs, enums and their conversions
//
// Reference: Rust Book §5 (Structs), §6 (Enums)

/// Parsed dataset lines, with and without labels
pub mod record;

/// Per-label training-set size requests
pub mod sample_request;

/// Error taxonomy shared by every layer
pub mod error;
