//! Chemical QC Dashboard CLI
//!
//! One-shot reporting run built on the chem-qc-core library:
//! - Generates the seeded batch table and classifies every batch
//! - Prints the console report (preview, tallies, parameter ranges)
//! - Renders the six-panel dashboard image
//! - Writes the three-sheet workbook
//!
//! Output locations and all constants are fixed; the only flags control
//! diagnostic logging on stderr.

use anyhow::{Context, Result};
use chem_qc_core::{generate_batches, summarize, GeneratorConfig, QcLimits};
use clap::Parser;
use std::io::{self, Write};

mod config;
mod report;

use config::ReportConfig;
use report::{console, dashboard, workbook};

/// Chemical QC Dashboard - synthesize, classify and report batch QC data
#[derive(Parser, Debug)]
#[command(name = "chem-qc-cli")]
#[command(about = "Generate the chemical QC console report, dashboard and workbook", long_about = None)]
#[command(version)]
struct Args {
    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Chemical QC CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using QC core library v{}", chem_qc_core::VERSION);

    run(&ReportConfig::new())
}

/// Generate, aggregate and report, stopping at the first failure
fn run(config: &ReportConfig) -> Result<()> {
    let generated = chrono::Local::now()
        .format(report::TIMESTAMP_FORMAT)
        .to_string();

    let generator = GeneratorConfig::new();
    let limits = QcLimits::default();
    let mut rng = generator.seeded_rng();

    let dataset = generate_batches(&generator, &limits, &mut rng)
        .context("Failed to generate batch data")?;
    log::info!("Generated {} batches", dataset.len());

    let stats = summarize(&dataset).context("Failed to aggregate QC statistics")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    console::write_report(&mut out, &dataset, &stats, &generated, config.preview_rows)?;

    dashboard::render_dashboard(&config.dashboard_path, &dataset, &stats, &limits, config)
        .context("Failed to render dashboard")?;
    console::write_saved(&mut out, "Dashboard", &config.dashboard_path)?;

    workbook::write_workbook(&config.workbook_path, &dataset, &stats, &generated)
        .context("Failed to write Excel report")?;
    console::write_saved(&mut out, "Excel report", &config.workbook_path)?;

    console::write_footer(&mut out)?;
    out.flush()?;

    log::info!("Report complete");
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
