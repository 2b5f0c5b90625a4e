//! Export module - display table and interactive map HTML

mod map;

pub use map::{ExportError, MapExporter, MapRow};
