//! QC classification
//!
//! A batch passes when pH and viscosity fall inside their limits and the
//! impurity level does not exceed its maximum. All bounds are inclusive.

use crate::config::QcLimits;
use crate::types::{Measurements, QcStatus};

/// Classify one batch against `limits`
pub fn classify(m: &Measurements, limits: &QcLimits) -> QcStatus {
    let status = if limits.ph.contains(m.ph)
        && limits.viscosity_cst.contains(m.viscosity_cst)
        && m.impurity_ppm <= limits.impurity_max_ppm
    {
        QcStatus::Pass
    } else {
        QcStatus::Fail
    };

    log::trace!(
        "pH={} viscosity={} impurity={} -> {}",
        m.ph,
        m.viscosity_cst,
        m.impurity_ppm,
        status
    );
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn measurements(ph: f64, viscosity_cst: f64, impurity_ppm: f64) -> Measurements {
        Measurements {
            ph,
            viscosity_cst,
            density_gml: 0.9,
            impurity_ppm,
            temperature_c: 25.0,
        }
    }

    #[test]
    fn test_lower_boundaries_pass() {
        let limits = QcLimits::default();
        assert_eq!(classify(&measurements(6.8, 115.0, 30.0), &limits), QcStatus::Pass);
    }

    #[test]
    fn test_upper_boundaries_pass() {
        let limits = QcLimits::default();
        assert_eq!(classify(&measurements(7.3, 135.0, 0.0), &limits), QcStatus::Pass);
    }

    #[test]
    fn test_ph_just_outside_fails() {
        let limits = QcLimits::default();
        assert_eq!(classify(&measurements(6.79, 120.0, 5.0), &limits), QcStatus::Fail);
        assert_eq!(classify(&measurements(7.31, 120.0, 5.0), &limits), QcStatus::Fail);
    }

    #[test]
    fn test_viscosity_and_impurity_limits() {
        let limits = QcLimits::default();
        assert_eq!(classify(&measurements(7.0, 114.9, 5.0), &limits), QcStatus::Fail);
        assert_eq!(classify(&measurements(7.0, 135.1, 5.0), &limits), QcStatus::Fail);
        assert_eq!(classify(&measurements(7.0, 120.0, 30.1), &limits), QcStatus::Fail);
    }

    #[test]
    fn test_density_and_temperature_ignored() {
        let limits = QcLimits::default();
        let m = Measurements {
            ph: 7.0,
            viscosity_cst: 120.0,
            density_gml: 5.0,
            impurity_ppm: 10.0,
            temperature_c: -40.0,
        };
        assert_eq!(classify(&m, &limits), QcStatus::Pass);
    }

    proptest! {
        #[test]
        fn ph_below_limit_always_fails(
            ph in 6.5_f64..6.79,
            viscosity in 110.0_f64..140.0,
            impurity in 0.0_f64..50.0,
        ) {
            let limits = QcLimits::default();
            prop_assert_eq!(classify(&measurements(ph, viscosity, impurity), &limits), QcStatus::Fail);
        }

        #[test]
        fn pass_iff_all_three_predicates(
            ph in 6.5_f64..7.5,
            viscosity in 110.0_f64..140.0,
            impurity in 0.0_f64..50.0,
        ) {
            let limits = QcLimits::default();
            let expected = (6.8..=7.3).contains(&ph)
                && (115.0..=135.0).contains(&viscosity)
                && impurity <= 30.0;
            let status = classify(&measurements(ph, viscosity, impurity), &limits);
            prop_assert_eq!(status.is_pass(), expected);
        }
    }
}
