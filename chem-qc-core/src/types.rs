//! Core types for the chemical QC library
//!
//! This module defines the batch record produced by the generator, the QC
//! status assigned by the classifier, the measured parameters, and the error
//! taxonomy shared by every stage of a reporting run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Result type for QC operations
pub type Result<T> = std::result::Result<T, QcError>;

/// Errors that can occur during a reporting run
#[derive(Debug, thiserror::Error)]
pub enum QcError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Statistics requested on an empty dataset")]
    EmptyDataset,

    #[error("Failed to write {path:?}: {reason}")]
    IoFailure { path: PathBuf, reason: String },
}

impl QcError {
    /// Build an `IoFailure` for an output file from any displayable error
    pub fn io_failure(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        QcError::IoFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Pass/fail label assigned to a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QcStatus {
    Pass,
    Fail,
}

impl QcStatus {
    pub fn is_pass(self) -> bool {
        self == QcStatus::Pass
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QcStatus::Pass => "PASS",
            QcStatus::Fail => "FAIL",
        }
    }
}

impl fmt::Display for QcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five measured values of one batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    #[serde(rename = "pH")]
    pub ph: f64,
    #[serde(rename = "Viscosity_cSt")]
    pub viscosity_cst: f64,
    #[serde(rename = "Density_gmL")]
    pub density_gml: f64,
    #[serde(rename = "Impurity_ppm")]
    pub impurity_ppm: f64,
    #[serde(rename = "Temperature_C")]
    pub temperature_c: f64,
}

/// One synthetic batch sample with its QC label
///
/// Records are only built through [`BatchRecord::new`], which classifies the
/// measurements once; the label is never recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchRecord {
    #[serde(rename = "Batch")]
    batch_id: String,
    #[serde(flatten)]
    measurements: Measurements,
    #[serde(rename = "QC_Status")]
    qc_status: QcStatus,
}

impl BatchRecord {
    /// Create a record for the 1-based sequence number `seq`, classifying it
    /// against `limits`
    pub fn new(seq: usize, measurements: Measurements, limits: &crate::QcLimits) -> Self {
        Self {
            batch_id: format_batch_id(seq),
            qc_status: crate::classifier::classify(&measurements, limits),
            measurements,
        }
    }

    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    pub fn measurements(&self) -> &Measurements {
        &self.measurements
    }

    pub fn qc_status(&self) -> QcStatus {
        self.qc_status
    }

    /// Value of one measured parameter
    pub fn value(&self, parameter: Parameter) -> f64 {
        parameter.value(&self.measurements)
    }
}

/// Format a 1-based sequence number as a batch id (`B001`, `B002`, ...)
pub fn format_batch_id(seq: usize) -> String {
    format!("B{:03}", seq)
}

/// A measured column of the batch table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parameter {
    Ph,
    Viscosity,
    Density,
    Impurity,
    Temperature,
}

impl Parameter {
    /// Every measured parameter, in table column order
    pub const ALL: [Parameter; 5] = [
        Parameter::Ph,
        Parameter::Viscosity,
        Parameter::Density,
        Parameter::Impurity,
        Parameter::Temperature,
    ];

    /// Parameters covered by the range report, descriptive table and
    /// correlation matrix
    pub const ANALYZED: [Parameter; 4] = [
        Parameter::Ph,
        Parameter::Viscosity,
        Parameter::Density,
        Parameter::Impurity,
    ];

    /// Column header used in the console table and the workbook
    pub fn column_name(self) -> &'static str {
        match self {
            Parameter::Ph => "pH",
            Parameter::Viscosity => "Viscosity_cSt",
            Parameter::Density => "Density_gmL",
            Parameter::Impurity => "Impurity_ppm",
            Parameter::Temperature => "Temperature_C",
        }
    }

    /// Engineering unit (empty for pH)
    pub fn unit(self) -> &'static str {
        match self {
            Parameter::Ph => "",
            Parameter::Viscosity => "cSt",
            Parameter::Density => "g/mL",
            Parameter::Impurity => "ppm",
            Parameter::Temperature => "°C",
        }
    }

    /// Number of decimals the generator rounds this parameter to
    pub fn decimals(self) -> u32 {
        match self {
            Parameter::Ph => 2,
            Parameter::Density => 3,
            Parameter::Viscosity | Parameter::Impurity | Parameter::Temperature => 1,
        }
    }

    pub fn value(self, m: &Measurements) -> f64 {
        match self {
            Parameter::Ph => m.ph,
            Parameter::Viscosity => m.viscosity_cst,
            Parameter::Density => m.density_gml,
            Parameter::Impurity => m.impurity_ppm,
            Parameter::Temperature => m.temperature_c,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// The classified batch table
///
/// Owns the records produced by one generator run and hands out read-only
/// views for display, statistics, charts and export.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchDataset {
    records: Vec<BatchRecord>,
}

impl BatchDataset {
    pub fn new(records: Vec<BatchRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[BatchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Values of one parameter in record order
    pub fn column(&self, parameter: Parameter) -> Vec<f64> {
        self.records.iter().map(|r| r.value(parameter)).collect()
    }

    pub fn count_status(&self, status: QcStatus) -> usize {
        self.records.iter().filter(|r| r.qc_status() == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QcLimits;

    fn sample(ph: f64) -> Measurements {
        Measurements {
            ph,
            viscosity_cst: 120.0,
            density_gml: 0.9,
            impurity_ppm: 10.0,
            temperature_c: 25.0,
        }
    }

    #[test]
    fn test_batch_id_format() {
        assert_eq!(format_batch_id(1), "B001");
        assert_eq!(format_batch_id(20), "B020");
        assert_eq!(format_batch_id(999), "B999");
    }

    #[test]
    fn test_record_is_classified_on_creation() {
        let limits = QcLimits::default();
        let good = BatchRecord::new(1, sample(7.0), &limits);
        let bad = BatchRecord::new(2, sample(7.4), &limits);

        assert_eq!(good.batch_id(), "B001");
        assert_eq!(good.qc_status(), QcStatus::Pass);
        assert_eq!(bad.qc_status(), QcStatus::Fail);
    }

    #[test]
    fn test_parameter_accessors() {
        let m = Measurements {
            ph: 7.1,
            viscosity_cst: 130.5,
            density_gml: 0.912,
            impurity_ppm: 12.3,
            temperature_c: 24.6,
        };
        let values: Vec<f64> = Parameter::ALL.iter().map(|p| p.value(&m)).collect();
        assert_eq!(values, vec![7.1, 130.5, 0.912, 12.3, 24.6]);
        assert_eq!(Parameter::Viscosity.to_string(), "Viscosity_cSt");
    }

    #[test]
    fn test_status_display() {
        assert_eq!(QcStatus::Pass.to_string(), "PASS");
        assert_eq!(format!("{}", QcStatus::Fail), "FAIL");
        assert!(QcStatus::Pass.is_pass());
    }

    #[test]
    fn test_dataset_counts() {
        let limits = QcLimits::default();
        let dataset = BatchDataset::new(vec![
            BatchRecord::new(1, sample(7.0), &limits),
            BatchRecord::new(2, sample(6.0), &limits),
            BatchRecord::new(3, sample(7.2), &limits),
        ]);

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.count_status(QcStatus::Pass), 2);
        assert_eq!(dataset.count_status(QcStatus::Fail), 1);
        assert_eq!(dataset.column(Parameter::Ph), vec![7.0, 6.0, 7.2]);
    }
}
