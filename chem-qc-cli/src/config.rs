//! Report output settings
//!
//! The run reads no configuration file or environment; these are the fixed
//! output locations and chart constants, kept in one place.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Dashboard image written to the working directory
pub const DASHBOARD_FILE: &str = "chemical_qc_dashboard.png";

/// Workbook written to the working directory
pub const WORKBOOK_FILE: &str = "chemical_qc_report.xlsx";

/// Reporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub dashboard_path: PathBuf,
    pub workbook_path: PathBuf,
    /// Records shown in the console preview table
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
    /// Bins of the pH histogram
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
    /// Reference line drawn on the pH histogram
    #[serde(default = "default_target_ph")]
    pub target_ph: f64,
    /// Dashboard canvas in pixels (15 x 10 in at 150 dpi)
    #[serde(default = "default_canvas_size")]
    pub canvas_size: (u32, u32),
}

fn default_preview_rows() -> usize {
    10
}

fn default_histogram_bins() -> usize {
    8
}

fn default_target_ph() -> f64 {
    7.0
}

fn default_canvas_size() -> (u32, u32) {
    (2250, 1500)
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            dashboard_path: PathBuf::from(DASHBOARD_FILE),
            workbook_path: PathBuf::from(WORKBOOK_FILE),
            preview_rows: default_preview_rows(),
            histogram_bins: default_histogram_bins(),
            target_ph: default_target_ph(),
            canvas_size: default_canvas_size(),
        }
    }
}

impl ReportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: place both output files under `dir`
    #[cfg(test)]
    pub fn with_output_dir(mut self, dir: &std::path::Path) -> Self {
        self.dashboard_path = dir.join(DASHBOARD_FILE);
        self.workbook_path = dir.join(WORKBOOK_FILE);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_default_outputs() {
        let config = ReportConfig::default();
        assert_eq!(config.dashboard_path, PathBuf::from("chemical_qc_dashboard.png"));
        assert_eq!(config.workbook_path, PathBuf::from("chemical_qc_report.xlsx"));
        assert_eq!(config.preview_rows, 10);
        assert_eq!(config.histogram_bins, 8);
        assert_eq!(config.canvas_size, (2250, 1500));
    }

    #[test]
    fn test_output_dir() {
        let config = ReportConfig::new().with_output_dir(Path::new("/tmp/qc"));
        assert_eq!(config.dashboard_path, Path::new("/tmp/qc/chemical_qc_dashboard.png"));
        assert_eq!(config.workbook_path, Path::new("/tmp/qc/chemical_qc_report.xlsx"));
    }
}
