//! Covidmap - COVID-19 county data preparation & interactive map export
//!
//! Joins the latest JHU daily county case report with census population
//! density, derives per-capita metrics, and exports the result as an
//! interactive map HTML.

pub mod config;
pub mod data;
pub mod export;
pub mod metrics;

use polars::prelude::DataFrame;
use thiserror::Error;

pub use config::PipelineConfig;
use data::{CaseLoader, DensityTable};
use export::MapExporter;
use metrics::MetricDeriver;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Loader(#[from] data::LoaderError),
    #[error(transparent)]
    Density(#[from] data::DensityError),
    #[error(transparent)]
    Metric(#[from] metrics::MetricError),
    #[error(transparent)]
    Export(#[from] export::ExportError),
}

/// Run the full pipeline: load, join, derive, export.
///
/// Returns the display frame that was written to the map HTML.
pub fn run(config: &PipelineConfig) -> Result<DataFrame, PipelineError> {
    let cases = CaseLoader::load_latest(&config.data_dir, &config.country)?;
    tracing::info!(rows = cases.height(), country = %config.country, "filtered case data");

    let density = DensityTable::load(&config.density_path, config.density_preamble_rows)?;
    tracing::info!(counties = density.len(), "loaded density reference");

    let joined = density.join(&cases, config.sqmi_to_sqkm)?;
    let derived = MetricDeriver::derive_per_capita(&joined)?;

    let display = MapExporter::build_display_frame(&derived)?;
    MapExporter::write_html(&display, &config.output_path, &config.map_title)?;
    tracing::info!(output = %config.output_path.display(), "map written");

    Ok(display)
}
