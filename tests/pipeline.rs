//! End-to-end pipeline tests over fixture files on disk.

use covidmap::config::{DENSITY_PREAMBLE_ROWS, SQMI_TO_SQKM};
use covidmap::PipelineConfig;
use std::path::Path;
use tempfile::TempDir;

const REPORT_HEADER: &str =
    "Admin2,Province_State,Country_Region,Lat,Long_,Confirmed,Deaths,Recovered,Active";

fn write_density_file(path: &Path, rows: &str) {
    // Real reference file carries a 3-line preamble before the header.
    let content = format!(
        "US Census population density\nSource: randstatestats.org\n\n\
         State,Area,Density_persons_per_square_mile\n{rows}"
    );
    std::fs::write(path, content).unwrap();
}

fn fixture_config(dir: &TempDir, report_rows: &str, density_rows: &str) -> PipelineConfig {
    let data_dir = dir.path().join("reports");
    std::fs::create_dir(&data_dir).unwrap();
    std::fs::write(
        data_dir.join("04-01-2020.csv"),
        format!("{REPORT_HEADER}\n{report_rows}"),
    )
    .unwrap();

    let density_path = dir.path().join("density.csv");
    write_density_file(&density_path, density_rows);

    PipelineConfig {
        data_dir,
        density_path,
        country: "US".to_string(),
        density_preamble_rows: DENSITY_PREAMBLE_ROWS,
        sqmi_to_sqkm: SQMI_TO_SQKM,
        output_path: dir.path().join("map.html"),
        map_title: "test map".to_string(),
    }
}

fn f64_at(df: &polars::prelude::DataFrame, column: &str, row: usize) -> f64 {
    df.column(column).unwrap().f64().unwrap().get(row).unwrap()
}

#[test]
fn test_los_angeles_scenario() {
    let dir = TempDir::new().unwrap();
    let config = fixture_config(
        &dir,
        "Los Angeles,California,US,34.05,-118.24,100,2,50,48\n",
        "California,Los Angeles,2000.0\n",
    );

    let display = covidmap::run(&config).unwrap();

    assert_eq!(display.height(), 1);
    let expected_density = 2000.0 / SQMI_TO_SQKM;
    let confirmed_pc = f64_at(&display, "Confirmed_per_capita", 0);
    assert!((confirmed_pc - 100.0 / expected_density).abs() < 1e-9);
    assert!((confirmed_pc - 0.1295).abs() < 1e-3);
    assert!((f64_at(&display, "Deaths_per_capita", 0) - 2.0 / expected_density).abs() < 1e-9);
    assert!((f64_at(&display, "Recovered_per_capita", 0) - 50.0 / expected_density).abs() < 1e-9);
    assert!((f64_at(&display, "Active_per_capita", 0) - 48.0 / expected_density).abs() < 1e-9);

    let html = std::fs::read_to_string(&config.output_path).unwrap();
    assert!(html.contains("Los Angeles"));
}

#[test]
fn test_unassigned_county_is_undefined_everywhere() {
    let dir = TempDir::new().unwrap();
    let config = fixture_config(
        &dir,
        "Los Angeles,California,US,34.05,-118.24,100,2,50,48\n\
         Unassigned,California,US,0.0,0.0,7,0,0,7\n",
        "California,Los Angeles,2000.0\n",
    );

    let display = covidmap::run(&config).unwrap();

    assert_eq!(display.height(), 2);
    for column in [
        "Confirmed_per_capita",
        "Deaths_per_capita",
        "Recovered_per_capita",
        "Active_per_capita",
    ] {
        assert!(f64_at(&display, column, 1).is_nan(), "{column} not NaN");
    }

    // The unmatched marker still appears in the export, with null metrics.
    let html = std::fs::read_to_string(&config.output_path).unwrap();
    assert!(html.contains("Unassigned"));
    assert!(html.contains("\"confirmed_per_capita\":null"));
}

#[test]
fn test_non_us_rows_are_excluded() {
    let dir = TempDir::new().unwrap();
    let config = fixture_config(
        &dir,
        "Los Angeles,California,US,34.05,-118.24,100,2,50,48\n\
         Maricopa,Arizona,USA,33.4,-112.0,80,2,15,63\n\
         Hillingdon,England,United Kingdom,51.5,-0.4,50,1,10,39\n",
        "California,Los Angeles,2000.0\n",
    );

    let display = covidmap::run(&config).unwrap();
    assert_eq!(display.height(), 1);
}
