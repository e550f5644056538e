//! Conversion pipeline and strategy selection for pageforge.
//!
//! This crate ties extraction, rendering and the AI delegate together into
//! the end-to-end `convert` workflow used by the CLI and the HTTP server.

pub mod pipeline;
pub mod strategy;

pub use pageforge_extract::Source;
pub use pipeline::{
    ConversionOutcome, ConversionRequest, Converter, ExtractionSummary, FileOutcome,
    ProgressReporter, SilentProgress, convert_rule_based,
};
pub use strategy::Strategy;
