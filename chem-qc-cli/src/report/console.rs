//! Console report
//!
//! Writes the text report to any `io::Write` sink so it can be captured in
//! tests; `main` passes a locked stdout.

use chem_qc_core::{BatchDataset, BatchRecord, Parameter, SummaryStats};
use std::io::{self, Write};
use std::path::Path;

const RULE_WIDTH: usize = 60;

/// Header, preview table, tallies and parameter ranges
pub fn write_report<W: Write>(
    out: &mut W,
    dataset: &BatchDataset,
    stats: &SummaryStats,
    generated: &str,
    preview_rows: usize,
) -> io::Result<()> {
    write_header(out, generated)?;

    writeln!(out, "\n📊 FIRST {} SAMPLES:", preview_rows.min(dataset.len()))?;
    write_preview(out, dataset, preview_rows)?;

    writeln!(out, "\n📈 QC STATISTICS:")?;
    writeln!(out, "Total Samples: {}", stats.total)?;
    writeln!(out, "Passed: {} ({:.1}%)", stats.pass_count, stats.pass_rate())?;
    writeln!(out, "Failed: {} ({:.1}%)", stats.fail_count, stats.fail_rate())?;

    writeln!(out, "\n🧪 PARAMETER RANGES:")?;
    for range in &stats.ranges {
        writeln!(
            out,
            "{:15}: Min={:.2}, Max={:.2}, Avg={:.2}",
            range.parameter.column_name(),
            range.min,
            range.max,
            range.mean
        )?;
    }
    Ok(())
}

pub fn write_header<W: Write>(out: &mut W, generated: &str) -> io::Result<()> {
    writeln!(out, "\n{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "CHEMICAL QUALITY CONTROL DASHBOARD")?;
    writeln!(out, "Generated: {}", generated)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))
}

/// Right-aligned table of the first `rows` records
pub fn write_preview<W: Write>(out: &mut W, dataset: &BatchDataset, rows: usize) -> io::Result<()> {
    let mut table = vec![header_row()];
    table.extend(dataset.records().iter().take(rows).map(record_row));

    let columns = table[0].len();
    let widths: Vec<usize> = (0..columns)
        .map(|c| table.iter().map(|row| row[c].chars().count()).max().unwrap_or(0))
        .collect();

    for row in &table {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:>width$}", cell, width = width))
            .collect();
        writeln!(out, "{}", line.join(" "))?;
    }
    Ok(())
}

fn header_row() -> Vec<String> {
    let mut row = vec!["Batch".to_string()];
    row.extend(Parameter::ALL.iter().map(|p| p.column_name().to_string()));
    row.push("QC_Status".to_string());
    row
}

fn record_row(record: &BatchRecord) -> Vec<String> {
    let mut row = vec![record.batch_id().to_string()];
    row.extend(Parameter::ALL.iter().map(|p| {
        format!("{:.*}", p.decimals() as usize, record.value(*p))
    }));
    row.push(record.qc_status().to_string());
    row
}

/// Confirmation line after an output file has been written
pub fn write_saved<W: Write>(out: &mut W, what: &str, path: &Path) -> io::Result<()> {
    writeln!(out, "\n✅ {} saved as '{}'", what, path.display())
}

pub fn write_footer<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "\n{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "ANALYSIS COMPLETE! 🎉")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))
}
