//! Chemical QC Core Library
//!
//! Synthesizes a table of chemical batch measurements, classifies each batch
//! against fixed quality thresholds, and aggregates the statistics a QC
//! report needs.
//!
//! # Architecture
//!
//! The library owns the data and the numbers; it never touches the console
//! or the filesystem:
//! - [`generate_batches`] draws a reproducible table from an explicit random source
//! - [`classify`] labels one batch PASS or FAIL
//! - [`summarize`] computes tallies, ranges, descriptive statistics and the
//!   correlation matrix
//!
//! Rendering the console report, the dashboard image and the workbook is the
//! job of the application layer (chem-qc-cli).
//!
//! # Example Usage
//!
//! ```
//! use chem_qc_core::{generate_batches, summarize, GeneratorConfig, QcLimits};
//!
//! let config = GeneratorConfig::new();
//! let mut rng = config.seeded_rng();
//! let dataset = generate_batches(&config, &QcLimits::default(), &mut rng).unwrap();
//!
//! let stats = summarize(&dataset).unwrap();
//! assert_eq!(stats.pass_count + stats.fail_count, dataset.len());
//! println!("Pass rate: {:.1}%", stats.pass_rate());
//! ```

// Public modules
pub mod classifier;
pub mod config;
pub mod generator;
pub mod stats;
pub mod types;

// Re-export main types for convenience
pub use classifier::classify;
pub use config::{
    GeneratorConfig, MeasurementRange, QcLimits, SamplingRanges, DEFAULT_SAMPLE_COUNT,
    DEFAULT_SEED, MAX_SAMPLE_COUNT,
};
pub use generator::{generate_batches, round_to};
pub use stats::{
    correlation_matrix, histogram, summarize, CorrelationMatrix, DescriptiveStats,
    HistogramBin, ParameterRange, SummaryStats,
};
pub use types::{
    BatchDataset, BatchRecord, Measurements, Parameter, QcError, QcStatus, Result,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: a default run produces the default number of batches
        let config = GeneratorConfig::new();
        let mut rng = config.seeded_rng();
        let dataset = generate_batches(&config, &QcLimits::default(), &mut rng).unwrap();
        assert_eq!(dataset.len(), DEFAULT_SAMPLE_COUNT);
    }
}
