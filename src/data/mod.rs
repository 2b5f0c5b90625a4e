//! Data module - case report loading and density reconciliation

mod density;
mod loader;

pub use density::{DensityError, DensityTable, MatchKind, DENSITY_KM_COLUMN, MATCH_COLUMN};
pub use loader::{
    CaseLoader, LoaderError, COUNTRY_COLUMN_CANDIDATES, COUNT_COLUMNS, COUNTY_COLUMN, LAT_COLUMN,
    LONG_COLUMN, PROVINCE_COLUMN,
};
