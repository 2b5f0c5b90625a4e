//! Pipeline Configuration Module
//! Paths and constants the pipeline takes as explicit input instead of
//! process-wide globals.

use std::path::PathBuf;

/// Persons/sq-mile to persons/sq-km divisor (1.60934 squared).
pub const SQMI_TO_SQKM: f64 = 2.5899752356;

/// Fixed preamble lines before the density table header.
pub const DENSITY_PREAMBLE_ROWS: usize = 3;

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory of daily-report CSVs.
    pub data_dir: PathBuf,
    /// County population-density reference CSV.
    pub density_path: PathBuf,
    /// Country kept by the case filter (exact match).
    pub country: String,
    /// Preamble lines to skip in the density CSV.
    pub density_preamble_rows: usize,
    /// Persons/sq-mile to persons/sq-km divisor.
    pub sqmi_to_sqkm: f64,
    /// Output map HTML path.
    pub output_path: PathBuf,
    /// Title of the exported map page.
    pub map_title: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(
                "../COVID-19/csse_covid_19_data/csse_covid_19_daily_reports",
            ),
            density_path: PathBuf::from("US-Census-Population-Density-2019.csv"),
            country: "US".to_string(),
            density_preamble_rows: DENSITY_PREAMBLE_ROWS,
            sqmi_to_sqkm: SQMI_TO_SQKM,
            output_path: PathBuf::from("covid19_per_capita.html"),
            map_title: "COVID-19 per-capita by county".to_string(),
        }
    }
}
