//! Per-Capita Derivation Module
//! Divides each case count by the joined population density.

use polars::prelude::*;
use thiserror::Error;

use crate::data::{COUNT_COLUMNS, DENSITY_KM_COLUMN};

/// Suffix appended to each count column name.
pub const PER_CAPITA_SUFFIX: &str = "_per_capita";

#[derive(Error, Debug)]
pub enum MetricError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Derives the per-capita ratio columns.
pub struct MetricDeriver;

impl MetricDeriver {
    /// Add a `<count>_per_capita` column for every count column.
    ///
    /// The ratio is NaN whenever the density is NaN or zero; undefined
    /// values propagate, division never fails.
    pub fn derive_per_capita(df: &DataFrame) -> Result<DataFrame, MetricError> {
        let ratios: Vec<Expr> = COUNT_COLUMNS
            .iter()
            .map(|count| {
                let density = col(DENSITY_KM_COLUMN);
                when(density.clone().eq(lit(0.0)))
                    .then(lit(f64::NAN))
                    .otherwise(col(*count).cast(DataType::Float64) / density)
                    .alias(format!("{count}{PER_CAPITA_SUFFIX}"))
            })
            .collect();

        let derived = df.clone().lazy().with_columns(ratios).collect()?;
        Ok(derived)
    }
}
