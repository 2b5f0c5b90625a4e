//! Covidmap - COVID-19 county data preparation & interactive map export

use clap::Parser;
use covidmap::config::{DENSITY_PREAMBLE_ROWS, SQMI_TO_SQKM};
use covidmap::PipelineConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "covidmap", about = "Prepare COVID-19 county data for map display")]
struct Args {
    /// Directory of JHU daily-report CSVs
    #[arg(
        long,
        default_value = "../COVID-19/csse_covid_19_data/csse_covid_19_daily_reports"
    )]
    data_dir: PathBuf,

    /// County population-density reference CSV
    #[arg(long, default_value = "US-Census-Population-Density-2019.csv")]
    density_file: PathBuf,

    /// Country to keep (exact match)
    #[arg(long, default_value = "US")]
    country: String,

    /// Output map HTML path
    #[arg(long, default_value = "covid19_per_capita.html")]
    output: PathBuf,

    /// Title of the exported map page
    #[arg(long, default_value = "COVID-19 per-capita by county")]
    title: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = PipelineConfig {
        data_dir: args.data_dir,
        density_path: args.density_file,
        country: args.country,
        density_preamble_rows: DENSITY_PREAMBLE_ROWS,
        sqmi_to_sqkm: SQMI_TO_SQKM,
        output_path: args.output,
        map_title: args.title,
    };

    let frame = covidmap::run(&config)?;
    tracing::info!(rows = frame.height(), "done");
    Ok(())
}
