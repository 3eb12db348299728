//! describe-raster and describe-table through the binary.

mod common;

use common::*;
use serde_json::json;

#[test]
fn describe_raster_summarizes_grid() {
    let env = TestEnv::new();
    env.write("dem.asc", SMALL_GRID);

    let result = env.primitive(
        "describe-raster",
        &json!({"raster": "dem.asc"}),
        "dem_out.asc",
        &json!({"units": "meters", "measurement_type": "elevation"}),
    );

    assert_eq!(result.exit_code, 0, "stderr: {}", result.stderr);
    let envelope = result.envelope();
    assert_eq!(envelope["crs"], "EPSG:4326");
    assert_eq!(envelope["dimensions"], json!({"rows": 2, "cols": 4}));
    assert_eq!(envelope["band_count"], 1);
    assert_eq!(envelope["nodata_percentage"], 12.5);
    assert_eq!(envelope["value_range"], json!({"min": 1.0, "max": 7.0}));
    assert_eq!(envelope["data_type"], "Int32");
    assert_eq!(envelope["units"], "meters");
    assert_eq!(envelope["measurement_type"], "elevation");
    assert_eq!(envelope["warnings"], json!([]));

    let written = env.read("dem_out.asc");
    assert!(written.contains("ncols"));
    assert!(env.path("dem_out.prj").is_file());
}

#[test]
fn describe_raster_reads_crs_sidecar() {
    let env = TestEnv::new();
    env.write("dem.asc", SMALL_GRID);
    env.write("dem.prj", "EPSG:3857");

    let result = env.primitive("describe-raster", &json!({"raster": "dem.asc"}), "out.asc", &json!({}));

    assert_eq!(result.envelope()["crs"], "EPSG:3857");
}

#[test]
fn describe_raster_all_nodata_is_critical_but_succeeds() {
    let env = TestEnv::new();
    env.write("empty.asc", EMPTY_GRID);

    let result = env.primitive("describe-raster", &json!({"raster": "empty.asc"}), "out.asc", &json!({}));

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.envelope()["nodata_percentage"], 100.0);
    assert_eq!(
        result.warnings(),
        vec![("critical".to_string(), "Raster contains only nodata cells".to_string())]
    );
    assert!(result.envelope().get("value_range").is_none());
}

#[test]
fn describe_raster_single_valid_cell_is_not_all_nodata() {
    let env = TestEnv::new();
    let mut grid = String::from("ncols 300\nnrows 100\nxllcorner 0\nyllcorner 0\ncellsize 1\nNODATA_value -1\n");
    for row in 0..100 {
        let cells: Vec<&str> = (0..300)
            .map(|col| if row == 0 && col == 0 { "5" } else { "-1" })
            .collect();
        grid.push_str(&cells.join(" "));
        grid.push('\n');
    }
    env.write("sparse.asc", &grid);

    let result = env.primitive("describe-raster", &json!({"raster": "sparse.asc"}), "out.asc", &json!({}));

    assert_eq!(result.exit_code, 0, "stderr: {}", result.stderr);
    assert_eq!(result.count_level("critical"), 0, "warnings: {:?}", result.warnings());
    assert_eq!(result.count_level("warning"), 1);
    assert_eq!(result.envelope()["value_range"], json!({"min": 5.0, "max": 5.0}));
}

#[test]
fn describe_raster_reprojects_on_request() {
    let env = TestEnv::new();
    env.write("dem.asc", SMALL_GRID);

    let result = env.primitive(
        "describe-raster",
        &json!({"raster": "dem.asc"}),
        "merc.asc",
        &json!({"target_crs": "EPSG:3857"}),
    );

    assert_eq!(result.exit_code, 0, "stderr: {}", result.stderr);
    assert_eq!(result.envelope()["crs"], "EPSG:3857");
    assert_eq!(result.count_level("info"), 1);
    assert_eq!(env.read("merc.prj").trim(), "EPSG:3857");
}

#[test]
fn describe_raster_rejects_vector_input() {
    let env = TestEnv::new();
    env.write("pts.geojson", &collection(Some("EPSG:4326"), vec![]));

    let result = env.primitive("describe-raster", &json!({"raster": "pts.geojson"}), "out.asc", &json!({}));

    assert_eq!(result.exit_code, 1);
    assert_eq!(result.error().as_deref(), Some("ExternalIOError"));
}

#[test]
fn describe_table_reports_missing_share() {
    let env = TestEnv::new();
    env.write("census.json", &census_records());

    let result = env.primitive(
        "describe-table",
        &json!({"table": "census.json"}),
        "census_out.json",
        &json!({"id_field": "tract_id", "spatial_unit": "census tract"}),
    );

    assert_eq!(result.exit_code, 0, "stderr: {}", result.stderr);
    let envelope = result.envelope();
    assert_eq!(envelope["row_count"], 10);
    assert_eq!(envelope["column_count"], 4);
    assert_eq!(
        envelope["data_quality"],
        json!({"complete_rows": 5, "missing_percentage": 12.5})
    );
    assert_eq!(envelope["id_field"], "tract_id");
    assert_eq!(envelope["spatial_unit"], "census tract");
    assert_eq!(envelope["warnings"], json!([]));
}

#[test]
fn describe_table_unknown_id_field_warns() {
    let env = TestEnv::new();
    env.write("census.json", &census_records());

    let result = env.primitive(
        "describe-table",
        &json!({"table": "census.json"}),
        "out.json",
        &json!({"id_field": "GEOID"}),
    );

    assert_eq!(result.status(), "success");
    assert_eq!(result.count_level("warning"), 1);
    assert!(result.envelope().get("id_field").is_none());
}

#[test]
fn describe_table_accepts_line_delimited_records() {
    let env = TestEnv::new();
    env.write("rows.ndjson", "{\"a\": 1, \"b\": null}\n{\"a\": 2, \"b\": 3}\n");

    let result = env.primitive("describe-table", &json!({"table": "rows.ndjson"}), "rows_out.ndjson", &json!({}));

    assert_eq!(result.exit_code, 0, "stderr: {}", result.stderr);
    assert_eq!(result.envelope()["data_quality"]["missing_percentage"], 25.0);
    assert_eq!(env.read("rows_out.ndjson").lines().count(), 2);
}
