//! Map Export Module
//! Builds the display table and writes it as a self-contained interactive
//! map HTML (Leaflet via CDN, dataset embedded as JSON).

use polars::prelude::*;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

use crate::data::{COUNTY_COLUMN, LAT_COLUMN, LONG_COLUMN};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("failed to serialize map data: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One marker on the exported map. Undefined metrics serialize as null.
#[derive(Debug, Serialize)]
pub struct MapRow {
    pub county: String,
    pub latitude: f64,
    pub longitude: f64,
    pub confirmed: i64,
    pub deaths: i64,
    pub recovered: i64,
    pub active: i64,
    pub confirmed_per_capita: Option<f64>,
    pub deaths_per_capita: Option<f64>,
    pub recovered_per_capita: Option<f64>,
    pub active_per_capita: Option<f64>,
}

/// Exports the final table as an interactive map artifact.
pub struct MapExporter;

impl MapExporter {
    /// Select and rename the derived frame down to the display schema.
    ///
    /// The match-provenance column is intentionally not exported.
    pub fn build_display_frame(df: &DataFrame) -> Result<DataFrame, ExportError> {
        let display = df
            .clone()
            .lazy()
            .select([
                col(COUNTY_COLUMN).alias("County"),
                col(LAT_COLUMN).alias("Latitude"),
                col(LONG_COLUMN).alias("Longitude"),
                col("Confirmed"),
                col("Deaths"),
                col("Recovered"),
                col("Active"),
                col("Confirmed_per_capita"),
                col("Deaths_per_capita"),
                col("Recovered_per_capita"),
                col("Active_per_capita"),
            ])
            .collect()?;
        Ok(display)
    }

    /// Write the display frame to `path` as a self-contained map HTML.
    pub fn write_html(display: &DataFrame, path: &Path, title: &str) -> Result<(), ExportError> {
        let rows = Self::collect_rows(display)?;
        let data = serde_json::to_string(&rows)?;
        let html = MAP_TEMPLATE
            .replace("__TITLE__", &escape_html(title))
            .replace("__DATA__", &data);
        std::fs::write(path, html)?;
        Ok(())
    }

    /// Flatten the display frame into serializable marker rows.
    fn collect_rows(df: &DataFrame) -> Result<Vec<MapRow>, ExportError> {
        let counties = str_values(df, "County")?;
        let latitudes = f64_values(df, "Latitude")?;
        let longitudes = f64_values(df, "Longitude")?;
        let confirmed = i64_values(df, "Confirmed")?;
        let deaths = i64_values(df, "Deaths")?;
        let recovered = i64_values(df, "Recovered")?;
        let active = i64_values(df, "Active")?;
        let confirmed_pc = f64_values(df, "Confirmed_per_capita")?;
        let deaths_pc = f64_values(df, "Deaths_per_capita")?;
        let recovered_pc = f64_values(df, "Recovered_per_capita")?;
        let active_pc = f64_values(df, "Active_per_capita")?;

        let rows = (0..df.height())
            .map(|i| MapRow {
                county: counties[i].clone(),
                latitude: latitudes[i],
                longitude: longitudes[i],
                confirmed: confirmed[i],
                deaths: deaths[i],
                recovered: recovered[i],
                active: active[i],
                confirmed_per_capita: finite(confirmed_pc[i]),
                deaths_per_capita: finite(deaths_pc[i]),
                recovered_per_capita: finite(recovered_pc[i]),
                active_per_capita: finite(active_pc[i]),
            })
            .collect();
        Ok(rows)
    }
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

fn str_values(df: &DataFrame, name: &str) -> Result<Vec<String>, ExportError> {
    Ok(df
        .column(name)?
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect())
}

fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<f64>, ExportError> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    Ok(column
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

fn i64_values(df: &DataFrame, name: &str) -> Result<Vec<i64>, ExportError> {
    let column = df.column(name)?.cast(&DataType::Int64)?;
    Ok(column.i64()?.into_iter().map(|v| v.unwrap_or(0)).collect())
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const MAP_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>__TITLE__</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>html, body, #map { height: 100%; margin: 0; }</style>
</head>
<body>
<div id="map"></div>
<script>
const rows = __DATA__;

const map = L.map('map').setView([39.8, -98.6], 4);
L.tileLayer('https://tile.openstreetmap.org/{z}/{x}/{y}.png', {
  attribution: '&copy; OpenStreetMap contributors'
}).addTo(map);

function fmt(v) { return v === null ? 'n/a' : v.toFixed(4); }

for (const row of rows) {
  const radius = row.confirmed_per_capita === null
    ? 4
    : Math.max(4, Math.sqrt(row.confirmed_per_capita) * 8);
  L.circleMarker([row.latitude, row.longitude], {
    radius: radius,
    color: '#e74c3c',
    weight: 1,
    fillOpacity: 0.5
  }).bindPopup(
    `<b>${row.county}</b><br>` +
    `Confirmed: ${row.confirmed} (${fmt(row.confirmed_per_capita)} per capita)<br>` +
    `Deaths: ${row.deaths} (${fmt(row.deaths_per_capita)} per capita)<br>` +
    `Recovered: ${row.recovered} (${fmt(row.recovered_per_capita)} per capita)<br>` +
    `Active: ${row.active} (${fmt(row.active_per_capita)} per capita)`
  ).addTo(map);
}
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DENSITY_KM_COLUMN, MATCH_COLUMN, PROVINCE_COLUMN};
    use tempfile::TempDir;

    fn derived_frame() -> DataFrame {
        df!(
            COUNTY_COLUMN => ["Los Angeles", "Unassigned"],
            PROVINCE_COLUMN => ["California", "California"],
            LAT_COLUMN => [34.05, 0.0],
            LONG_COLUMN => [-118.24, 0.0],
            "Confirmed" => [100i64, 7i64],
            "Deaths" => [2i64, 0i64],
            "Recovered" => [50i64, 0i64],
            "Active" => [48i64, 7i64],
            DENSITY_KM_COLUMN => [772.2080, f64::NAN],
            MATCH_COLUMN => ["exact", "none"],
            "Confirmed_per_capita" => [0.1295, f64::NAN],
            "Deaths_per_capita" => [0.00259, f64::NAN],
            "Recovered_per_capita" => [0.06475, f64::NAN],
            "Active_per_capita" => [0.06216, f64::NAN],
        )
        .unwrap()
    }

    #[test]
    fn test_display_schema() {
        let display = MapExporter::build_display_frame(&derived_frame()).unwrap();
        let names: Vec<String> = display
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "County",
                "Latitude",
                "Longitude",
                "Confirmed",
                "Deaths",
                "Recovered",
                "Active",
                "Confirmed_per_capita",
                "Deaths_per_capita",
                "Recovered_per_capita",
                "Active_per_capita",
            ]
        );
        assert_eq!(display.height(), 2);
    }

    #[test]
    fn test_html_embeds_rows_and_nulls_nan() {
        let display = MapExporter::build_display_frame(&derived_frame()).unwrap();
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("map.html");

        MapExporter::write_html(&display, &out, "COVID-19 <test>").unwrap();

        let html = std::fs::read_to_string(&out).unwrap();
        assert!(html.contains("Los Angeles"));
        assert!(html.contains("Unassigned"));
        assert!(html.contains("\"confirmed_per_capita\":0.1295"));
        // NaN per-capita values become JSON null
        assert!(html.contains("\"confirmed_per_capita\":null"));
        // Title is escaped
        assert!(html.contains("COVID-19 &lt;test&gt;"));
    }
}
