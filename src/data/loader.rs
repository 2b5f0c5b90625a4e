//! Case Report Loader Module
//! Finds and loads the most recent JHU daily-report CSV using Polars.

use chrono::NaiveDate;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// County-equivalent name column (Admin2 in the JHU schema).
pub const COUNTY_COLUMN: &str = "Admin2";
/// State/province name column.
pub const PROVINCE_COLUMN: &str = "Province_State";
/// Latitude column.
pub const LAT_COLUMN: &str = "Lat";
/// Longitude column.
pub const LONG_COLUMN: &str = "Long_";
/// The four case-count columns, in output order.
pub const COUNT_COLUMNS: [&str; 4] = ["Confirmed", "Deaths", "Recovered", "Active"];

/// Candidate names for the country column, tried in order. The daily-report
/// archive changed the separator character partway through.
pub const COUNTRY_COLUMN_CANDIDATES: [&str; 2] = ["Country_Region", "Country/Region"];

/// Filename date formats seen in the daily-report archive.
const STEM_DATE_FORMATS: [&str; 2] = ["%m-%d-%Y", "%Y-%m-%d"];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("no CSV data files found in {}", .0.display())]
    NoDataFilesFound(PathBuf),
    #[error("none of the candidate columns {candidates:?} present in {}", path.display())]
    SchemaMismatch {
        path: PathBuf,
        candidates: Vec<String>,
    },
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Loads the latest daily case report and filters it to one country.
pub struct CaseLoader;

impl CaseLoader {
    /// Load the most recent daily report in `data_dir` filtered to `country`.
    ///
    /// The country match is exact, and any row with a missing value in any
    /// column is dropped before the result is returned.
    pub fn load_latest(data_dir: &Path, country: &str) -> Result<DataFrame, LoaderError> {
        let report = Self::latest_report(data_dir)?;
        tracing::info!(report = %report.display(), "loading case data");

        let df = LazyCsvReader::new(report.to_string_lossy().as_ref())
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        let country_col = Self::resolve_country_column(&df, &report)?;

        let filtered = df
            .lazy()
            .filter(col(country_col).eq(lit(country)))
            .drop_nulls(None)
            .collect()?;

        Ok(filtered)
    }

    /// Pick the most recent report file in `data_dir`.
    ///
    /// File stems are parsed as dates (`MM-DD-YYYY` or `YYYY-MM-DD`) and the
    /// latest date wins. If any stem fails to parse, selection falls back to
    /// the lexicographically-last filename, which is only correct for
    /// zero-padded ISO-like names.
    pub fn latest_report(data_dir: &Path) -> Result<PathBuf, LoaderError> {
        let mut reports: Vec<PathBuf> = std::fs::read_dir(data_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
            })
            .collect();
        reports.sort();

        let dated: Vec<(NaiveDate, PathBuf)> = reports
            .iter()
            .filter_map(|path| Self::stem_date(path).map(|date| (date, path.clone())))
            .collect();

        if dated.len() == reports.len() {
            dated
                .into_iter()
                .max_by(|a, b| a.0.cmp(&b.0))
                .map(|(_, path)| path)
                .ok_or_else(|| LoaderError::NoDataFilesFound(data_dir.to_path_buf()))
        } else {
            if !reports.is_empty() {
                tracing::warn!(
                    dir = %data_dir.display(),
                    "report filenames are not all date-stamped, using lexicographic order"
                );
            }
            reports
                .pop()
                .ok_or_else(|| LoaderError::NoDataFilesFound(data_dir.to_path_buf()))
        }
    }

    /// Parse a report filename stem as a date.
    fn stem_date(path: &Path) -> Option<NaiveDate> {
        let stem = path.file_stem()?.to_str()?;
        STEM_DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(stem, fmt).ok())
    }

    /// Resolve the country column under its candidate spellings.
    fn resolve_country_column(df: &DataFrame, path: &Path) -> Result<&'static str, LoaderError> {
        COUNTRY_COLUMN_CANDIDATES
            .iter()
            .copied()
            .find(|name| df.column(name).is_ok())
            .ok_or_else(|| LoaderError::SchemaMismatch {
                path: path.to_path_buf(),
                candidates: COUNTRY_COLUMN_CANDIDATES
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            })
    }
}
