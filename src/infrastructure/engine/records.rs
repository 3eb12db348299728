//! Tabular records: a JSON array of objects, or one object per line (NDJSON).

use std::path::Path;

use serde_json::{Map, Value};

use crate::domain::entities::TabularData;

/// Keys recognised as the geometry column, in priority order
const GEOMETRY_COLUMNS: &[&str] = &["geometry", "geom"];

pub fn is_line_delimited(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("ndjson") | Some("jsonl")
    )
}

pub fn parse(text: &str, line_delimited: bool) -> Result<TabularData, String> {
    let rows = if line_delimited {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str::<Value>(line)
                    .map_err(|e| format!("line {}: {}", i + 1, e))
                    .and_then(|v| into_row(v).map_err(|e| format!("line {}: {}", i + 1, e)))
            })
            .collect::<Result<Vec<_>, _>>()?
    } else {
        match serde_json::from_str::<Value>(text).map_err(|e| e.to_string())? {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, v)| into_row(v).map_err(|e| format!("record {}: {}", i, e)))
                .collect::<Result<Vec<_>, _>>()?,
            _ => return Err("expected a JSON array of records".to_string()),
        }
    };

    let mut columns: Vec<String> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let geometry_column = GEOMETRY_COLUMNS
        .iter()
        .find(|g| columns.iter().any(|c| c == *g))
        .map(|g| g.to_string());

    Ok(TabularData {
        columns,
        rows,
        geometry_column,
    })
}

fn into_row(value: Value) -> Result<Map<String, Value>, String> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err("record must be an object".to_string()),
    }
}

pub fn render(data: &TabularData, line_delimited: bool) -> Result<String, serde_json::Error> {
    if line_delimited {
        let mut out = String::new();
        for row in &data.rows {
            out.push_str(&serde_json::to_string(row)?);
            out.push('\n');
        }
        Ok(out)
    } else {
        serde_json::to_string(&data.rows)
    }
}
