//! Dashboard image
//!
//! Six panels on a 2x3 grid:
//!
//! | pH histogram | viscosity vs density | impurity by batch |
//! |--------------|----------------------|-------------------|
//! | status pie   | temperature trend    | correlation map   |

use crate::config::ReportConfig;
use chem_qc_core::{
    histogram, BatchDataset, CorrelationMatrix, Parameter, QcError, QcLimits, QcStatus,
    SummaryStats,
};
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::error::Error;
use std::ops::Range;
use std::path::Path;

type DrawResult = std::result::Result<(), Box<dyn Error>>;

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const PASS_GREEN: RGBColor = RGBColor(0, 128, 0);
const FAIL_RED: RGBColor = RGBColor(220, 20, 20);
const LIGHT_GREEN: RGBColor = RGBColor(144, 238, 144);
const LIGHT_CORAL: RGBColor = RGBColor(240, 128, 128);
const TREND_ORANGE: RGBColor = RGBColor(255, 165, 0);
const UNDEFINED_GREY: RGBColor = RGBColor(200, 200, 200);

const DASH_LENGTH: u32 = 12;
const DASH_GAP: u32 = 8;

const TITLE_FONT: (&str, u32) = ("sans-serif", 26);
const LABEL_FONT: (&str, u32) = ("sans-serif", 16);

/// Render all six panels to a PNG at `path`
pub fn render_dashboard(
    path: &Path,
    dataset: &BatchDataset,
    stats: &SummaryStats,
    limits: &QcLimits,
    config: &ReportConfig,
) -> chem_qc_core::Result<()> {
    if dataset.is_empty() {
        return Err(QcError::EmptyDataset);
    }
    log::info!("Rendering dashboard: {:?}", path);

    draw_dashboard(path, dataset, stats, limits, config)
        .map_err(|e| QcError::io_failure(path, e))?;

    log::debug!("Dashboard rendered at {}x{}", config.canvas_size.0, config.canvas_size.1);
    Ok(())
}

fn draw_dashboard(
    path: &Path,
    dataset: &BatchDataset,
    stats: &SummaryStats,
    limits: &QcLimits,
    config: &ReportConfig,
) -> DrawResult {
    let root = BitMapBackend::new(path, config.canvas_size).into_drawing_area();
    draw_panels(&root, dataset, stats, limits, config)?;
    root.present()?;
    Ok(())
}

fn draw_panels<DB>(
    root: &DrawingArea<DB, Shift>,
    dataset: &BatchDataset,
    stats: &SummaryStats,
    limits: &QcLimits,
    config: &ReportConfig,
) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let root = root.titled(
        "Chemical Quality Control Dashboard",
        ("sans-serif", 40).into_font().style(FontStyle::Bold),
    )?;

    let panels = root.split_evenly((2, 3));
    draw_ph_histogram(&panels[0], dataset, config)?;
    draw_viscosity_density(&panels[1], dataset)?;
    draw_impurity_bars(&panels[2], dataset, limits)?;
    draw_status_pie(&panels[3], stats)?;
    draw_temperature_trend(&panels[4], dataset)?;
    draw_correlation_heatmap(&panels[5], &stats.correlation)?;
    Ok(())
}

fn status_color(status: QcStatus) -> RGBColor {
    match status {
        QcStatus::Pass => PASS_GREEN,
        QcStatus::Fail => FAIL_RED,
    }
}

fn draw_ph_histogram<DB>(
    area: &DrawingArea<DB, Shift>,
    dataset: &BatchDataset,
    config: &ReportConfig,
) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let bins = histogram(&dataset.column(Parameter::Ph), config.histogram_bins);
    let target = config.target_ph;

    let lower = bins.first().map_or(target, |b| b.lower).min(target);
    let upper = bins.last().map_or(target, |b| b.upper).max(target);
    let pad = (upper - lower) * 0.05;
    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0) as f64;
    let y_max = max_count + 1.0;

    let mut chart = ChartBuilder::on(area)
        .caption("pH Distribution", TITLE_FONT)
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d((lower - pad)..(upper + pad), 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("pH")
        .y_desc("Frequency")
        .light_line_style(BLACK.mix(0.05))
        .bold_line_style(BLACK.mix(0.15))
        .label_style(LABEL_FONT)
        .draw()?;

    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], SKY_BLUE.mix(0.7).filled())
    }))?;
    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], BLACK.stroke_width(1))
    }))?;

    chart
        .draw_series(DashedLineSeries::new(
            vec![(target, 0.0), (target, y_max)],
            DASH_LENGTH,
            DASH_GAP,
            RED.stroke_width(2),
        ))?
        .label("Target pH")
        .legend(|(x, y)| {
            EmptyElement::at((x, y))
                + PathElement::new(vec![(0, 0), (8, 0)], RED.stroke_width(2))
                + PathElement::new(vec![(14, 0), (22, 0)], RED.stroke_width(2))
        });

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(LABEL_FONT)
        .draw()?;
    Ok(())
}

fn draw_viscosity_density<DB>(area: &DrawingArea<DB, Shift>, dataset: &BatchDataset) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let x_range = padded_range(&dataset.column(Parameter::Viscosity), 0.08);
    let y_range = padded_range(&dataset.column(Parameter::Density), 0.08);

    let mut chart = ChartBuilder::on(area)
        .caption("Viscosity vs Density", TITLE_FONT)
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(65)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc("Viscosity (cSt)")
        .y_desc("Density (g/mL)")
        .y_label_formatter(&|v| format!("{:.3}", v))
        .light_line_style(BLACK.mix(0.05))
        .bold_line_style(BLACK.mix(0.15))
        .label_style(LABEL_FONT)
        .draw()?;

    let points: Vec<((f64, f64), QcStatus)> = dataset
        .records()
        .iter()
        .map(|r| {
            (
                (r.value(Parameter::Viscosity), r.value(Parameter::Density)),
                r.qc_status(),
            )
        })
        .collect();

    chart.draw_series(
        points
            .iter()
            .map(|(p, status)| Circle::new(*p, 7, status_color(*status).mix(0.7).filled())),
    )?;
    chart.draw_series(points.iter().map(|(p, _)| Circle::new(*p, 7, BLACK.stroke_width(1))))?;
    Ok(())
}

fn draw_impurity_bars<DB>(
    area: &DrawingArea<DB, Shift>,
    dataset: &BatchDataset,
    limits: &QcLimits,
) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let ids: Vec<&str> = dataset.records().iter().map(|r| r.batch_id()).collect();
    let n = ids.len();
    let limit = limits.impurity_max_ppm;
    let peak = dataset
        .column(Parameter::Impurity)
        .into_iter()
        .fold(limit, f64::max);

    let mut chart = ChartBuilder::on(area)
        .caption("Impurity Levels by Batch", TITLE_FONT)
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..peak * 1.1)?;

    let label = |x: &f64| batch_label(&ids, *x);
    chart
        .configure_mesh()
        .x_desc("Batch ID")
        .y_desc("Impurity (ppm)")
        .x_labels(n)
        .x_label_formatter(&label)
        .disable_x_mesh()
        .light_line_style(BLACK.mix(0.05))
        .bold_line_style(BLACK.mix(0.15))
        .label_style(("sans-serif", 12))
        .draw()?;

    chart.draw_series(dataset.records().iter().enumerate().map(|(i, r)| {
        let x = i as f64;
        Rectangle::new(
            [(x - 0.4, 0.0), (x + 0.4, r.value(Parameter::Impurity))],
            status_color(r.qc_status()).filled(),
        )
    }))?;
    chart.draw_series(dataset.records().iter().enumerate().map(|(i, r)| {
        let x = i as f64;
        Rectangle::new(
            [(x - 0.4, 0.0), (x + 0.4, r.value(Parameter::Impurity))],
            BLACK.stroke_width(1),
        )
    }))?;

    chart
        .draw_series(DashedLineSeries::new(
            vec![(-0.5, limit), (n as f64 - 0.5, limit)],
            DASH_LENGTH,
            DASH_GAP,
            RED.stroke_width(2),
        ))?
        .label(format!("Max Limit ({} ppm)", limit))
        .legend(|(x, y)| {
            EmptyElement::at((x, y))
                + PathElement::new(vec![(0, 0), (8, 0)], RED.stroke_width(2))
                + PathElement::new(vec![(14, 0), (22, 0)], RED.stroke_width(2))
        });

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(LABEL_FONT)
        .draw()?;
    Ok(())
}

fn draw_status_pie<DB>(area: &DrawingArea<DB, Shift>, stats: &SummaryStats) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let area = area.titled("QC Status Distribution", TITLE_FONT)?;
    let (w, h) = area.dim_in_pixel();
    // Pie takes canvas coordinates, not panel-relative ones
    let (x0, y0) = area.get_base_pixel();
    let center = (x0 + w as i32 / 2, y0 + h as i32 / 2);
    let radius = w.min(h) as f64 * 0.35;

    let mut sizes = Vec::new();
    let mut colors = Vec::new();
    let mut labels = Vec::new();
    for (status, count, color) in [
        (QcStatus::Pass, stats.pass_count, LIGHT_GREEN),
        (QcStatus::Fail, stats.fail_count, LIGHT_CORAL),
    ] {
        // zero-sized slices would still get a label
        if count > 0 {
            sizes.push(count as f64);
            colors.push(color);
            labels.push(status.as_str());
        }
    }

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(90.0);
    pie.label_style(("sans-serif", 20).into_font().color(&BLACK));
    pie.percentages(("sans-serif", 18).into_font().color(&BLACK));
    area.draw(&pie)?;
    Ok(())
}

fn draw_temperature_trend<DB>(area: &DrawingArea<DB, Shift>, dataset: &BatchDataset) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let ids: Vec<&str> = dataset.records().iter().map(|r| r.batch_id()).collect();
    let n = ids.len();
    let temps = dataset.column(Parameter::Temperature);
    let y_range = padded_range(&temps, 0.15);
    let baseline = y_range.start;

    let points: Vec<(f64, f64)> = temps
        .iter()
        .enumerate()
        .map(|(i, t)| (i as f64, *t))
        .collect();

    let mut chart = ChartBuilder::on(area)
        .caption("Temperature Trend", TITLE_FONT)
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_range)?;

    let label = |x: &f64| batch_label(&ids, *x);
    chart
        .configure_mesh()
        .x_desc("Batch ID")
        .y_desc("Temperature (°C)")
        .x_labels(n)
        .x_label_formatter(&label)
        .light_line_style(BLACK.mix(0.05))
        .bold_line_style(BLACK.mix(0.15))
        .label_style(("sans-serif", 12))
        .draw()?;

    chart.draw_series(AreaSeries::new(
        points.iter().copied(),
        baseline,
        TREND_ORANGE.mix(0.3),
    ))?;
    chart.draw_series(LineSeries::new(
        points.iter().copied(),
        TREND_ORANGE.stroke_width(2),
    ))?;
    chart.draw_series(
        points
            .iter()
            .map(|p| Circle::new(*p, 5, TREND_ORANGE.filled())),
    )?;
    Ok(())
}

fn draw_correlation_heatmap<DB>(
    area: &DrawingArea<DB, Shift>,
    matrix: &CorrelationMatrix,
) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let area = area.titled("Parameter Correlation Matrix", TITLE_FONT)?;
    let (w, _) = area.dim_in_pixel();
    let (map_area, bar_area) = area.split_horizontally(w * 82 / 100);

    let p = matrix.size() as i32;
    let names: Vec<&str> = matrix.parameters().iter().map(|p| p.column_name()).collect();

    let mut chart = ChartBuilder::on(&map_area)
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(110)
        .build_cartesian_2d(0i32..p, p..0i32)?;

    let (plot_w, plot_h) = chart.plotting_area().dim_in_pixel();
    let cell_w = plot_w as i32 / p.max(1);
    let cell_h = plot_h as i32 / p.max(1);

    let name_at = |v: &i32| names.get(*v as usize).map(|s| s.to_string()).unwrap_or_default();
    chart
        .configure_mesh()
        .x_labels(p as usize)
        .y_labels(p as usize)
        .x_label_offset(cell_w / 2)
        .y_label_offset(cell_h / 2)
        .x_label_formatter(&name_at)
        .y_label_formatter(&name_at)
        .disable_x_mesh()
        .disable_y_mesh()
        .label_style(("sans-serif", 13))
        .draw()?;

    let cells: Vec<(i32, i32, Option<f64>)> = (0..p)
        .flat_map(|row| (0..p).map(move |col| (col, row)))
        .map(|(col, row)| (col, row, matrix.get(row as usize, col as usize)))
        .collect();

    chart.draw_series(cells.iter().map(|&(x, y, r)| {
        let color = r.map_or(UNDEFINED_GREY, coolwarm);
        Rectangle::new([(x, y), (x + 1, y + 1)], color.filled())
    }))?;

    let text_style = ("sans-serif", 18)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    chart.draw_series(cells.iter().map(|&(x, y, r)| {
        let text = r.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v));
        EmptyElement::at((x, y)) + Text::new(text, (cell_w / 2, cell_h / 2), text_style.clone())
    }))?;

    draw_color_bar(&bar_area)
}

fn draw_color_bar<DB>(area: &DrawingArea<DB, Shift>) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    const STEPS: usize = 50;

    let mut chart = ChartBuilder::on(area)
        .margin_top(15)
        .margin_bottom(55)
        .margin_right(10)
        .y_label_area_size(45)
        .build_cartesian_2d(0f64..1f64, -1f64..1f64)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(5)
        .y_label_formatter(&|v| format!("{:.1}", v))
        .label_style(("sans-serif", 13))
        .draw()?;

    let step = 2.0 / STEPS as f64;
    chart.draw_series((0..STEPS).map(|i| {
        let lo = -1.0 + step * i as f64;
        Rectangle::new([(0.0, lo), (1.0, lo + step)], coolwarm(lo + step / 2.0).filled())
    }))?;
    Ok(())
}

/// Diverging blue-white-red scale over [-1, 1]
pub fn coolwarm(r: f64) -> RGBColor {
    const COOL: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

    let t = r.clamp(-1.0, 1.0);
    let (from, to, frac) = if t < 0.0 {
        (COOL, MID, t + 1.0)
    } else {
        (MID, WARM, t)
    };
    let lerp = |a: f64, b: f64| (a + (b - a) * frac).round() as u8;
    RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

/// Axis range covering `values` with `pad` of the span on each side
pub fn padded_range(values: &[f64], pad: f64) -> Range<f64> {
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    let span = hi - lo;
    if span <= 0.0 {
        return (lo - 1.0)..(hi + 1.0);
    }
    (lo - span * pad)..(hi + span * pad)
}

/// Batch id for an integer tick, blank between bars
pub fn batch_label(ids: &[&str], x: f64) -> String {
    let nearest = x.round();
    if (x - nearest).abs() > 1e-6 || nearest < 0.0 {
        return String::new();
    }
    ids.get(nearest as usize).map(|s| s.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chem_qc_core::{generate_batches, summarize, GeneratorConfig};

    fn run(sample_count: usize) -> (BatchDataset, SummaryStats) {
        let config = GeneratorConfig::new().with_sample_count(sample_count);
        let mut rng = config.seeded_rng();
        let dataset = generate_batches(&config, &QcLimits::default(), &mut rng).unwrap();
        let stats = summarize(&dataset).unwrap();
        (dataset, stats)
    }

    /// Width and height from the IHDR chunk of a PNG file
    fn png_size(bytes: &[u8]) -> (u32, u32) {
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
        let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
        (width, height)
    }

    /// Pixels of `colors` inside the rectangle `[x0, x1) x [y0, y1)` of an RGB buffer
    fn count_pixels(
        buf: &[u8],
        width: u32,
        (x0, x1): (u32, u32),
        (y0, y1): (u32, u32),
        colors: &[RGBColor],
    ) -> usize {
        let mut count = 0;
        for y in y0..y1 {
            for x in x0..x1 {
                let i = ((y * width + x) * 3) as usize;
                let pixel = RGBColor(buf[i], buf[i + 1], buf[i + 2]);
                if colors.contains(&pixel) {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn test_render_default_run() {
        let (dataset, stats) = run(20);
        let dir = tempfile::tempdir().unwrap();
        let report = ReportConfig::new().with_output_dir(dir.path());

        render_dashboard(&report.dashboard_path, &dataset, &stats, &QcLimits::default(), &report)
            .unwrap();

        let bytes = std::fs::read(&report.dashboard_path).unwrap();
        assert_eq!(png_size(&bytes), (2250, 1500));
    }

    #[test]
    fn test_render_single_batch() {
        let (dataset, stats) = run(1);
        let p = stats.correlation.size();
        assert!((0..p).all(|row| (0..p).all(|col| stats.correlation.get(row, col).is_none())));
        assert_eq!(stats.pass_count + stats.fail_count, 1);

        let dir = tempfile::tempdir().unwrap();
        let report = ReportConfig::new().with_output_dir(dir.path());

        render_dashboard(&report.dashboard_path, &dataset, &stats, &QcLimits::default(), &report)
            .unwrap();

        let bytes = std::fs::read(&report.dashboard_path).unwrap();
        assert_eq!(png_size(&bytes), (2250, 1500));
    }

    #[test]
    fn test_pie_lands_in_bottom_left_panel() {
        let (dataset, stats) = run(20);
        let report = ReportConfig::new();
        let (w, h) = report.canvas_size;
        let mut buf = vec![0u8; (w * h * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
            draw_panels(&root, &dataset, &stats, &QcLimits::default(), &report).unwrap();
            root.present().unwrap();
        }

        let slices = [LIGHT_GREEN, LIGHT_CORAL];
        let left = (0, w / 3);
        let top = count_pixels(&buf, w, left, (0, h / 2), &slices);
        let bottom = count_pixels(&buf, w, left, (h / 2, h), &slices);

        assert_eq!(top, 0, "pie drawn over the pH histogram");
        assert!(bottom > 10_000, "pie missing from its panel: {} pixels", bottom);

        // only the bottom-left panel holds pie colors
        let rest = count_pixels(&buf, w, (w / 3, w), (0, h), &slices);
        assert_eq!(rest, 0);
    }

    #[test]
    fn test_coolwarm_endpoints() {
        assert_eq!(coolwarm(-1.0), RGBColor(59, 76, 192));
        assert_eq!(coolwarm(0.0), RGBColor(221, 221, 221));
        assert_eq!(coolwarm(1.0), RGBColor(180, 4, 38));
        // out-of-range values saturate
        assert_eq!(coolwarm(3.0), coolwarm(1.0));
    }

    #[test]
    fn test_padded_range() {
        let range = padded_range(&[10.0, 20.0], 0.1);
        assert!((range.start - 9.0).abs() < 1e-12);
        assert!((range.end - 21.0).abs() < 1e-12);

        let flat = padded_range(&[5.0, 5.0], 0.1);
        assert_eq!(flat, 4.0..6.0);
        assert_eq!(padded_range(&[], 0.1), 0.0..1.0);
    }

    #[test]
    fn test_batch_label() {
        let ids = ["B001", "B002", "B003"];
        assert_eq!(batch_label(&ids, 0.0), "B001");
        assert_eq!(batch_label(&ids, 2.0), "B003");
        assert_eq!(batch_label(&ids, 1.5), "");
        assert_eq!(batch_label(&ids, 3.0), "");
        assert_eq!(batch_label(&ids, -1.0), "");
    }

    #[test]
    fn test_status_colors_differ() {
        assert_ne!(status_color(QcStatus::Pass), status_color(QcStatus::Fail));
    }

    #[test]
    fn test_unwritable_path_is_io_failure() {
        let config = GeneratorConfig::new();
        let mut rng = config.seeded_rng();
        let limits = QcLimits::default();
        let dataset = generate_batches(&config, &limits, &mut rng).unwrap();
        let stats = summarize(&dataset).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let report = ReportConfig::new().with_output_dir(&dir.path().join("missing"));
        let result = render_dashboard(&report.dashboard_path, &dataset, &stats, &limits, &report);
        assert!(matches!(result, Err(QcError::IoFailure { .. })));
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let config = GeneratorConfig::new();
        let mut rng = config.seeded_rng();
        let limits = QcLimits::default();
        let dataset = generate_batches(&config, &limits, &mut rng).unwrap();
        let stats = summarize(&dataset).unwrap();

        let report = ReportConfig::new();
        let result = render_dashboard(
            &report.dashboard_path,
            &BatchDataset::default(),
            &stats,
            &limits,
            &report,
        );
        assert!(matches!(result, Err(QcError::EmptyDataset)));
    }
}
