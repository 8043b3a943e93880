// ============================================================
// Layer 5 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by several commands:
//
//   config.rs   — PipelineConfig, loaded from JSON and merged
//                 with command-line flags
//
//   output.rs   — result files written to a temporary file and
//                 renamed into place only on success
//
//   manifest.rs — JSON record of each split (seed, per-label
//                 counts) so a split can be reproduced
//
//   prompt.rs   — console input for the interactive menu,
//                 reading from an explicitly passed stream
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Pipeline settings
pub mod config;

/// Write-then-rename output files
pub mod output;

/// Split manifest persistence
pub mod manifest;

/// Interactive console prompts
pub mod prompt;
