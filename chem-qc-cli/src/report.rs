//! Report generation
//!
//! Renders one run's dataset and statistics three ways: a console report,
//! a dashboard image, and a three-sheet workbook.

pub mod console;
pub mod dashboard;
pub mod workbook;

/// Timestamp format shared by the console header and the workbook
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
