//! Synthetic batch generation
//!
//! Draws each measurement uniformly from its sampling range and rounds it to
//! the parameter's display precision. The random source is passed in by the
//! caller, so a fixed seed always reproduces the same table.

use crate::config::{GeneratorConfig, QcLimits};
use crate::types::{BatchDataset, BatchRecord, Measurements, Parameter, Result};
use rand::Rng;

/// Generate `config.sample_count` classified batches
///
/// A sample count of zero yields an empty dataset. Counts beyond the batch id
/// space and invalid sampling ranges fail with `InvalidInput`.
///
/// # Example
/// ```
/// use chem_qc_core::{generate_batches, GeneratorConfig, QcLimits};
///
/// let config = GeneratorConfig::new().with_sample_count(3);
/// let mut rng = config.seeded_rng();
/// let dataset = generate_batches(&config, &QcLimits::default(), &mut rng).unwrap();
/// assert_eq!(dataset.records()[0].batch_id(), "B001");
/// ```
pub fn generate_batches<R: Rng>(
    config: &GeneratorConfig,
    limits: &QcLimits,
    rng: &mut R,
) -> Result<BatchDataset> {
    config.validate()?;
    log::debug!(
        "Generating {} batches (seed {})",
        config.sample_count,
        config.seed
    );

    let records = (1..=config.sample_count)
        .map(|seq| {
            let measurements = sample_measurements(config, rng);
            BatchRecord::new(seq, measurements, limits)
        })
        .collect();

    Ok(BatchDataset::new(records))
}

fn sample_measurements<R: Rng>(config: &GeneratorConfig, rng: &mut R) -> Measurements {
    let mut draw = |parameter: Parameter| {
        let range = config.ranges.get(parameter);
        round_to(rng.gen_range(range.min..range.max), parameter.decimals())
    };

    Measurements {
        ph: draw(Parameter::Ph),
        viscosity_cst: draw(Parameter::Viscosity),
        density_gml: draw(Parameter::Density),
        impurity_ppm: draw(Parameter::Impurity),
        temperature_c: draw(Parameter::Temperature),
    }
}

/// Round to `decimals` places, ties to even
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round_ties_even() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QcError;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(7.123, 2), 7.12);
        assert_eq!(round_to(0.91249, 3), 0.912);
        assert_eq!(round_to(127.46, 1), 127.5);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(3.5, 0), 4.0);
    }

    #[test]
    fn test_zero_samples_is_empty() {
        let config = GeneratorConfig::new().with_sample_count(0);
        let mut rng = config.seeded_rng();
        let dataset = generate_batches(&config, &QcLimits::default(), &mut rng).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_too_many_samples_rejected() {
        let config = GeneratorConfig::new().with_sample_count(1000);
        let mut rng = config.seeded_rng();
        let result = generate_batches(&config, &QcLimits::default(), &mut rng);
        assert!(matches!(result, Err(QcError::InvalidInput(_))));
    }

    #[test]
    fn test_batch_ids_sequential() {
        let config = GeneratorConfig::new().with_sample_count(12);
        let mut rng = config.seeded_rng();
        let dataset = generate_batches(&config, &QcLimits::default(), &mut rng).unwrap();

        let ids: Vec<&str> = dataset.records().iter().map(|r| r.batch_id()).collect();
        assert_eq!(ids.first(), Some(&"B001"));
        assert_eq!(ids.last(), Some(&"B012"));
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(*id, format!("B{:03}", i + 1));
        }
    }

    #[test]
    fn test_values_have_declared_precision() {
        let config = GeneratorConfig::new().with_sample_count(50);
        let mut rng = config.seeded_rng();
        let dataset = generate_batches(&config, &QcLimits::default(), &mut rng).unwrap();

        for record in dataset.records() {
            for parameter in Parameter::ALL {
                let value = record.value(parameter);
                assert_eq!(value, round_to(value, parameter.decimals()));
            }
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let limits = QcLimits::default();
        let a = GeneratorConfig::new().with_seed(1);
        let b = GeneratorConfig::new().with_seed(2);
        let first = generate_batches(&a, &limits, &mut a.seeded_rng()).unwrap();
        let second = generate_batches(&b, &limits, &mut b.seeded_rng()).unwrap();
        assert_ne!(first, second);
    }
}
