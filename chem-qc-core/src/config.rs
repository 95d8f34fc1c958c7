//! Hard-coded run configuration
//!
//! The reporting run is not configurable from the outside: these types only
//! give names to the fixed constants (sample count, seed, sampling ranges and
//! QC limits) and let tests build variants with the builder methods.

use crate::types::{Parameter, QcError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Number of batches synthesized by a default run
pub const DEFAULT_SAMPLE_COUNT: usize = 20;

/// Seed used for reproducible runs
pub const DEFAULT_SEED: u64 = 42;

/// Largest sample count that still fits the 3-digit batch id format
pub const MAX_SAMPLE_COUNT: usize = 999;

/// Closed interval `[min, max]` of a measured value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRange {
    pub min: f64,
    pub max: f64,
}

impl MeasurementRange {
    /// Create a range, rejecting non-finite or inverted bounds
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// Const constructor for the built-in constants (not validated)
    pub const fn fixed(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(QcError::InvalidInput(format!(
                "range bounds must be finite, got [{}, {}]",
                self.min, self.max
            )));
        }
        if self.min >= self.max {
            return Err(QcError::InvalidInput(format!(
                "range minimum {} must be below maximum {}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Inclusive on both ends
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Uniform sampling interval for each measured parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingRanges {
    pub ph: MeasurementRange,
    pub viscosity_cst: MeasurementRange,
    pub density_gml: MeasurementRange,
    pub impurity_ppm: MeasurementRange,
    pub temperature_c: MeasurementRange,
}

impl Default for SamplingRanges {
    fn default() -> Self {
        Self {
            ph: MeasurementRange::fixed(6.5, 7.5),
            viscosity_cst: MeasurementRange::fixed(110.0, 140.0),
            density_gml: MeasurementRange::fixed(0.85, 0.95),
            impurity_ppm: MeasurementRange::fixed(0.0, 50.0),
            temperature_c: MeasurementRange::fixed(22.0, 28.0),
        }
    }
}

impl SamplingRanges {
    pub fn get(&self, parameter: Parameter) -> MeasurementRange {
        match parameter {
            Parameter::Ph => self.ph,
            Parameter::Viscosity => self.viscosity_cst,
            Parameter::Density => self.density_gml,
            Parameter::Impurity => self.impurity_ppm,
            Parameter::Temperature => self.temperature_c,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for parameter in Parameter::ALL {
            self.get(parameter).validate().map_err(|e| match e {
                QcError::InvalidInput(msg) => {
                    QcError::InvalidInput(format!("{}: {}", parameter, msg))
                }
                other => other,
            })?;
        }
        Ok(())
    }
}

/// Configuration for the batch generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of batches to synthesize
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,

    /// Seed for the ChaCha8 random source
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Sampling interval per parameter
    #[serde(default)]
    pub ranges: SamplingRanges,
}

fn default_sample_count() -> usize {
    DEFAULT_SAMPLE_COUNT
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            seed: DEFAULT_SEED,
            ranges: SamplingRanges::default(),
        }
    }
}

impl GeneratorConfig {
    /// Create a generator configuration with the built-in constants
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the number of batches
    pub fn with_sample_count(mut self, count: usize) -> Self {
        self.sample_count = count;
        self
    }

    /// Builder method: set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder method: replace the sampling ranges
    pub fn with_ranges(mut self, ranges: SamplingRanges) -> Self {
        self.ranges = ranges;
        self
    }

    /// Fresh random source seeded from `self.seed`
    pub fn seeded_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_count > MAX_SAMPLE_COUNT {
            return Err(QcError::InvalidInput(format!(
                "sample count {} exceeds the batch id limit of {}",
                self.sample_count, MAX_SAMPLE_COUNT
            )));
        }
        self.ranges.validate()
    }
}

/// Acceptance thresholds for the QC decision
///
/// Density and temperature are recorded but carry no limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QcLimits {
    pub ph: MeasurementRange,
    pub viscosity_cst: MeasurementRange,
    /// Upper impurity limit in ppm (inclusive)
    pub impurity_max_ppm: f64,
}

impl Default for QcLimits {
    fn default() -> Self {
        Self {
            ph: MeasurementRange::fixed(6.8, 7.3),
            viscosity_cst: MeasurementRange::fixed(115.0, 135.0),
            impurity_max_ppm: 30.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_config_builder() {
        let config = GeneratorConfig::new().with_sample_count(5).with_seed(7);

        assert_eq!(config.sample_count, 5);
        assert_eq!(config.seed, 7);
        assert_eq!(config.ranges, SamplingRanges::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.sample_count, 20);
        assert_eq!(config.seed, 42);

        let limits = QcLimits::default();
        assert_eq!(limits.ph, MeasurementRange::fixed(6.8, 7.3));
        assert_eq!(limits.impurity_max_ppm, 30.0);
    }

    #[test]
    fn test_range_validation() {
        assert!(MeasurementRange::new(1.0, 2.0).is_ok());
        assert!(matches!(
            MeasurementRange::new(2.0, 1.0),
            Err(QcError::InvalidInput(_))
        ));
        assert!(matches!(
            MeasurementRange::new(f64::NAN, 1.0),
            Err(QcError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_range_contains_is_inclusive() {
        let range = MeasurementRange::fixed(6.8, 7.3);
        assert!(range.contains(6.8));
        assert!(range.contains(7.3));
        assert!(!range.contains(6.79));
        assert!(!range.contains(7.31));
    }

    #[test]
    fn test_sample_count_limit() {
        let config = GeneratorConfig::new().with_sample_count(MAX_SAMPLE_COUNT + 1);
        assert!(matches!(config.validate(), Err(QcError::InvalidInput(_))));
    }

    #[test]
    fn test_inverted_sampling_range_rejected() {
        let mut ranges = SamplingRanges::default();
        ranges.density_gml = MeasurementRange::fixed(0.95, 0.85);
        let err = GeneratorConfig::new().with_ranges(ranges).validate().unwrap_err();
        assert!(err.to_string().contains("Density_gmL"));
    }
}
