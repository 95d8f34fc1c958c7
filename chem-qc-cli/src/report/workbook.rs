//! Spreadsheet export
//!
//! Three sheets:
//! - Raw Data: one row per batch, 7 columns
//! - Summary: key metrics as Metric / Value pairs
//! - Statistics: descriptive table of the analyzed parameters

use chem_qc_core::{BatchDataset, DescriptiveStats, Parameter, QcError, QcStatus, SummaryStats};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use std::path::Path;

pub const RAW_DATA_SHEET: &str = "Raw Data";
pub const SUMMARY_SHEET: &str = "Summary";
pub const STATISTICS_SHEET: &str = "Statistics";

/// One cell of a sheet table
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Blank,
}

impl CellValue {
    fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }
}

/// Build the workbook and save it to `path`
pub fn write_workbook(
    path: &Path,
    dataset: &BatchDataset,
    stats: &SummaryStats,
    analysis_date: &str,
) -> chem_qc_core::Result<()> {
    log::info!("Writing workbook: {:?}", path);

    let mut workbook =
        build_workbook(dataset, stats, analysis_date).map_err(|e| QcError::io_failure(path, e))?;
    workbook
        .save(path)
        .map_err(|e| QcError::io_failure(path, e))?;

    log::debug!("Workbook saved with {} data rows", dataset.len());
    Ok(())
}

/// Assemble all three sheets in memory
pub fn build_workbook(
    dataset: &BatchDataset,
    stats: &SummaryStats,
    analysis_date: &str,
) -> Result<Workbook, XlsxError> {
    let formats = Formats::new();
    let mut workbook = Workbook::new();

    write_raw_data(&mut workbook, &formats, dataset)?;
    write_summary(&mut workbook, &formats, stats, analysis_date)?;
    write_statistics(&mut workbook, &formats, stats)?;

    Ok(workbook)
}

struct Formats {
    header: Format,
    text: Format,
    pass: Format,
    fail: Format,
    stat_label: Format,
    stat_value: Format,
    stat_count: Format,
}

impl Formats {
    fn new() -> Self {
        let header = Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_background_color(Color::RGB(0xD9E1F2))
            .set_border(FormatBorder::Thin);
        let text = Format::new().set_border(FormatBorder::Thin);
        let pass = Format::new()
            .set_border(FormatBorder::Thin)
            .set_font_color(Color::RGB(0x006100))
            .set_background_color(Color::RGB(0xC6EFCE));
        let fail = Format::new()
            .set_border(FormatBorder::Thin)
            .set_font_color(Color::RGB(0x9C0006))
            .set_background_color(Color::RGB(0xFFC7CE));
        let stat_label = Format::new().set_bold().set_border(FormatBorder::Thin);

        Self {
            header,
            text,
            pass,
            fail,
            stat_label,
            stat_value: Self::number(4),
            stat_count: Self::number(0),
        }
    }

    fn number(decimals: u32) -> Format {
        let num_format = match decimals {
            0 => "0".to_string(),
            d => format!("0.{}", "0".repeat(d as usize)),
        };
        Format::new()
            .set_num_format(num_format)
            .set_border(FormatBorder::Thin)
    }

    fn status(&self, status: QcStatus) -> &Format {
        match status {
            QcStatus::Pass => &self.pass,
            QcStatus::Fail => &self.fail,
        }
    }

    /// Value format of a Statistics row; counts are whole numbers
    fn statistic(&self, label: &str) -> &Format {
        match label {
            "count" => &self.stat_count,
            _ => &self.stat_value,
        }
    }
}

fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    format: &Format,
) -> Result<(), XlsxError> {
    match value {
        CellValue::Number(n) => {
            sheet.write_number_with_format(row, col, *n, format)?;
        }
        CellValue::Text(s) => {
            sheet.write_string_with_format(row, col, s, format)?;
        }
        // undefined values stay blank
        CellValue::Blank => {}
    }
    Ok(())
}

fn write_header(
    sheet: &mut Worksheet,
    header: &[CellValue],
    format: &Format,
) -> Result<(), XlsxError> {
    for (c, value) in header.iter().enumerate() {
        write_cell(sheet, 0, c as u16, value, format)?;
    }
    Ok(())
}

/// Raw Data table: header row, then one row per batch
pub fn raw_data_table(dataset: &BatchDataset) -> Vec<Vec<CellValue>> {
    let mut header = vec![CellValue::text("Batch")];
    header.extend(Parameter::ALL.iter().map(|p| CellValue::text(p.column_name())));
    header.push(CellValue::text("QC_Status"));

    let mut table = vec![header];
    table.extend(dataset.records().iter().map(|record| {
        let mut row = vec![CellValue::text(record.batch_id())];
        row.extend(Parameter::ALL.iter().map(|p| CellValue::Number(record.value(*p))));
        row.push(CellValue::text(record.qc_status().as_str()));
        row
    }));
    table
}

fn write_raw_data(
    workbook: &mut Workbook,
    formats: &Formats,
    dataset: &BatchDataset,
) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(RAW_DATA_SHEET)?;

    let table = raw_data_table(dataset);
    let status_col = Parameter::ALL.len() + 1;
    let number_formats: Vec<Format> = Parameter::ALL
        .iter()
        .map(|p| Formats::number(p.decimals()))
        .collect();

    write_header(sheet, &table[0], &formats.header)?;
    for (r, (cells, record)) in table[1..].iter().zip(dataset.records()).enumerate() {
        let row = r as u32 + 1;
        for (c, value) in cells.iter().enumerate() {
            let format = match c {
                0 => &formats.text,
                c if c == status_col => formats.status(record.qc_status()),
                c => &number_formats[c - 1],
            };
            write_cell(sheet, row, c as u16, value, format)?;
        }
    }

    sheet.set_column_width(0, 10)?;
    for col in 1..=status_col as u16 {
        sheet.set_column_width(col, 15)?;
    }
    sheet.set_freeze_panes(1, 0)?;
    Ok(())
}

/// Summary table: `Metric` / `Value` header, then the key metrics
pub fn summary_table(stats: &SummaryStats, analysis_date: &str) -> Vec<Vec<CellValue>> {
    let mean = |p: Parameter| stats.mean(p).unwrap_or_default();
    let metric = |name: &str, value: CellValue| vec![CellValue::text(name), value];

    vec![
        vec![CellValue::text("Metric"), CellValue::text("Value")],
        metric("Total Batches", CellValue::Number(stats.total as f64)),
        metric("Pass Rate", CellValue::Text(format!("{:.1}%", stats.pass_rate()))),
        metric("Fail Rate", CellValue::Text(format!("{:.1}%", stats.fail_rate()))),
        metric("Average pH", CellValue::Text(format!("{:.2}", mean(Parameter::Ph)))),
        metric(
            "Average Viscosity",
            CellValue::Text(format!("{:.1} cSt", mean(Parameter::Viscosity))),
        ),
        metric(
            "Average Impurity",
            CellValue::Text(format!("{:.1} ppm", mean(Parameter::Impurity))),
        ),
        metric("Analysis Date", CellValue::text(analysis_date)),
    ]
}

fn write_summary(
    workbook: &mut Workbook,
    formats: &Formats,
    stats: &SummaryStats,
    analysis_date: &str,
) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(SUMMARY_SHEET)?;

    let table = summary_table(stats, analysis_date);
    write_header(sheet, &table[0], &formats.header)?;
    for (r, cells) in table[1..].iter().enumerate() {
        let row = r as u32 + 1;
        write_cell(sheet, row, 0, &cells[0], &formats.stat_label)?;
        write_cell(sheet, row, 1, &cells[1], &formats.text)?;
    }

    sheet.set_column_width(0, 20)?;
    sheet.set_column_width(1, 20)?;
    Ok(())
}

/// Statistics table: blank corner plus field headers, then one row per
/// descriptive statistic
pub fn statistics_table(stats: &SummaryStats) -> Vec<Vec<CellValue>> {
    let mut header = vec![CellValue::Blank];
    header.extend(
        stats
            .descriptive
            .iter()
            .map(|d| CellValue::text(d.parameter.column_name())),
    );

    let mut table = vec![header];
    for (r, label) in DescriptiveStats::ROW_LABELS.iter().enumerate() {
        let mut row = vec![CellValue::text(*label)];
        row.extend(
            stats
                .descriptive
                .iter()
                .map(|d| d.rows()[r].map_or(CellValue::Blank, CellValue::Number)),
        );
        table.push(row);
    }
    table
}

fn write_statistics(
    workbook: &mut Workbook,
    formats: &Formats,
    stats: &SummaryStats,
) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(STATISTICS_SHEET)?;

    let table = statistics_table(stats);
    sheet.write_blank(0, 0, &formats.header)?;
    write_header(sheet, &table[0], &formats.header)?;
    for (r, (cells, label)) in table[1..]
        .iter()
        .zip(DescriptiveStats::ROW_LABELS)
        .enumerate()
    {
        let row = r as u32 + 1;
        write_cell(sheet, row, 0, &cells[0], &formats.stat_label)?;
        for (c, value) in cells.iter().enumerate().skip(1) {
            write_cell(sheet, row, c as u16, value, formats.statistic(label))?;
        }
    }

    sheet.set_column_width(0, 8)?;
    for c in 1..=stats.descriptive.len() {
        sheet.set_column_width(c as u16, 15)?;
    }
    Ok(())
}
