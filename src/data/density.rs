//! Density Reference Module
//! Loads the census population-density table and reconciles county names
//! against it.

use polars::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::loader::{COUNTY_COLUMN, PROVINCE_COLUMN};

/// Column appended to the case table holding density in persons per sq km.
pub const DENSITY_KM_COLUMN: &str = "Density_persons_per_square_km";
/// Column recording which match tier produced each density value.
pub const MATCH_COLUMN: &str = "Density_match";

const REF_STATE_COLUMN: &str = "State";
const REF_AREA_COLUMN: &str = "Area";
const REF_DENSITY_COLUMN: &str = "Density_persons_per_square_mile";

#[derive(Error, Debug)]
pub enum DensityError {
    #[error("density table {} is missing required column {column}", path.display())]
    SchemaMismatch { path: PathBuf, column: &'static str },
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
}

/// How a case row was reconciled against the reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Normalized (state, area) key matched exactly.
    Exact,
    /// Case-sensitive substring scan matched, first row in table order.
    Fuzzy,
    Unmatched,
}

impl MatchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchKind::Exact => "exact",
            MatchKind::Fuzzy => "fuzzy",
            MatchKind::Unmatched => "none",
        }
    }
}

/// County population-density reference table, persons per square mile.
pub struct DensityTable {
    states: Vec<String>,
    areas: Vec<String>,
    densities: Vec<f64>,
    /// Normalized (state, area) -> first row with that key.
    exact: HashMap<(String, String), usize>,
}

impl DensityTable {
    /// Load the reference CSV, skipping its fixed preamble lines.
    pub fn load(path: &Path, preamble_rows: usize) -> Result<Self, DensityError> {
        let df = LazyCsvReader::new(path.to_string_lossy().as_ref())
            .with_skip_rows(preamble_rows)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        Self::from_frame(&df, path)
    }

    /// Build the table from an already-parsed frame.
    pub fn from_frame(df: &DataFrame, path: &Path) -> Result<Self, DensityError> {
        let require = |column: &'static str| {
            df.column(column).map_err(|_| DensityError::SchemaMismatch {
                path: path.to_path_buf(),
                column,
            })
        };

        let states = require(REF_STATE_COLUMN)?.str()?;
        let areas = require(REF_AREA_COLUMN)?.str()?;
        let density = require(REF_DENSITY_COLUMN)?.cast(&DataType::Float64)?;
        let density = density.f64()?;

        let mut table = Self {
            states: Vec::with_capacity(df.height()),
            areas: Vec::with_capacity(df.height()),
            densities: Vec::with_capacity(df.height()),
            exact: HashMap::new(),
        };

        for i in 0..df.height() {
            let (Some(state), Some(area)) = (states.get(i), areas.get(i)) else {
                continue;
            };
            let row = table.states.len();
            table
                .exact
                .entry((normalize(state), normalize(area)))
                .or_insert(row);
            table.states.push(state.to_string());
            table.areas.push(area.to_string());
            table.densities.push(density.get(i).unwrap_or(f64::NAN));
        }

        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Find the density (persons per square mile) for one case row.
    ///
    /// A normalized exact match on the composite (state, area) key is tried
    /// first; failing that, the substring scan: the first row in table order
    /// whose state contains `state` and whose area contains `county`, both
    /// case-sensitive.
    pub fn lookup(&self, state: &str, county: &str) -> (f64, MatchKind) {
        if let Some(&row) = self.exact.get(&(normalize(state), normalize(county))) {
            return (self.densities[row], MatchKind::Exact);
        }

        for row in 0..self.states.len() {
            if self.states[row].contains(state) && self.areas[row].contains(county) {
                return (self.densities[row], MatchKind::Fuzzy);
            }
        }

        (f64::NAN, MatchKind::Unmatched)
    }

    /// Append the converted density and match-provenance columns to `cases`.
    ///
    /// Rows with an empty county get NaN directly with no lookup; unmatched
    /// rows get NaN and a notice naming the county. `sqmi_to_sqkm` is the
    /// persons/sq-mile to persons/sq-km divisor.
    pub fn join(&self, cases: &DataFrame, sqmi_to_sqkm: f64) -> Result<DataFrame, DensityError> {
        let counties = cases.column(COUNTY_COLUMN)?.str()?;
        let states = cases.column(PROVINCE_COLUMN)?.str()?;

        let mut densities: Vec<f64> = Vec::with_capacity(cases.height());
        let mut matches: Vec<&'static str> = Vec::with_capacity(cases.height());

        for i in 0..cases.height() {
            let county = counties.get(i).unwrap_or("");
            if county.is_empty() {
                densities.push(f64::NAN);
                matches.push(MatchKind::Unmatched.as_str());
                continue;
            }

            let state = states.get(i).unwrap_or("");
            let (density_sqmi, kind) = self.lookup(state, county);
            match kind {
                MatchKind::Unmatched => {
                    tracing::warn!(county, state, "no density match");
                    densities.push(f64::NAN);
                }
                _ => densities.push(density_sqmi / sqmi_to_sqkm),
            }
            matches.push(kind.as_str());
        }

        let mut joined = cases.clone();
        joined.with_column(Column::new(DENSITY_KM_COLUMN.into(), densities))?;
        joined.with_column(Column::new(MATCH_COLUMN.into(), matches))?;
        Ok(joined)
    }
}

/// Case-fold, strip punctuation, collapse whitespace.
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
