//! ESRI ASCII grid codec (single band).
//!
//! ```text
//! ncols        4
//! nrows        2
//! xllcorner    0.0
//! yllcorner    0.0
//! cellsize     30
//! NODATA_value -9999
//! 1 2 3 4
//! 5 6 7 -9999
//! ```
//!
//! `xllcenter`/`yllcenter` and `dx`/`dy` are accepted on read. The CRS is
//! not part of the format; the engine keeps it in a `.prj` sidecar.

use std::fmt::Write as _;

use crate::domain::entities::{Band, RasterData, RasterDataType};
use crate::domain::value_objects::Crs;

/// Sentinel written when a band has NaN cells but no nodata value
pub const FALLBACK_NODATA: f64 = -9999.0;

#[derive(Debug, Default)]
struct Header {
    ncols: Option<usize>,
    nrows: Option<usize>,
    xll: Option<f64>,
    yll: Option<f64>,
    centered: bool,
    dx: Option<f64>,
    dy: Option<f64>,
    nodata: Option<f64>,
}

/// Parse a grid; the CRS comes from elsewhere.
pub fn parse(text: &str, crs: Crs) -> Result<RasterData, String> {
    let mut header = Header::default();
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty()).peekable();

    while let Some(&line) = lines.peek() {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            break;
        };
        if key.parse::<f64>().is_ok() {
            break;
        }
        let number = |v: &str| v.parse::<f64>().map_err(|_| format!("bad header value for {}: {}", key, v));
        match key.to_ascii_lowercase().as_str() {
            "ncols" => header.ncols = Some(count(value)?),
            "nrows" => header.nrows = Some(count(value)?),
            "xllcorner" => header.xll = Some(number(value)?),
            "yllcorner" => header.yll = Some(number(value)?),
            "xllcenter" => {
                header.xll = Some(number(value)?);
                header.centered = true;
            }
            "yllcenter" => {
                header.yll = Some(number(value)?);
                header.centered = true;
            }
            "cellsize" => {
                let size = number(value)?;
                header.dx = Some(size);
                header.dy = Some(size);
            }
            "dx" => header.dx = Some(number(value)?),
            "dy" => header.dy = Some(number(value)?),
            "nodata_value" => header.nodata = Some(number(value)?),
            other => return Err(format!("unknown header key '{}'", other)),
        }
        lines.next();
    }

    let ncols = header.ncols.ok_or("missing ncols")?;
    let nrows = header.nrows.ok_or("missing nrows")?;
    let dx = header.dx.ok_or("missing cellsize")?;
    let dy = header.dy.ok_or("missing cellsize")?;
    if !(dx > 0.0 && dy > 0.0) {
        return Err("cell size must be positive".to_string());
    }
    let mut xll = header.xll.ok_or("missing xllcorner")?;
    let mut yll = header.yll.ok_or("missing yllcorner")?;
    if header.centered {
        xll -= dx / 2.0;
        yll -= dy / 2.0;
    }

    let mut integral = true;
    let mut values = Vec::with_capacity(ncols.saturating_mul(nrows).min(1 << 20));
    for token in lines.flat_map(str::split_whitespace) {
        let value: f64 = token.parse().map_err(|_| format!("bad cell value '{}'", token))?;
        integral &= !token.contains(['.', 'e', 'E']) && value.is_finite();
        values.push(value);
    }

    let expected = ncols
        .checked_mul(nrows)
        .ok_or("grid dimensions overflow")?;
    if values.len() != expected {
        return Err(format!("expected {} cells, found {}", expected, values.len()));
    }

    Ok(RasterData {
        crs,
        cols: ncols,
        rows: nrows,
        origin: [xll, yll],
        res_x: dx,
        res_y: dy,
        bands: vec![Band::new(values, header.nodata)],
        data_type: if integral {
            RasterDataType::Int32
        } else {
            RasterDataType::Float64
        },
    })
}

fn count(value: &str) -> Result<usize, String> {
    value.parse().map_err(|_| format!("bad grid dimension '{}'", value))
}

/// Render the first band. Missing cells are written as the nodata sentinel.
pub fn render(data: &RasterData) -> Result<String, String> {
    let band = data.bands.first().ok_or("raster has no bands")?;
    if band.values.len() != data.cols * data.rows {
        return Err("band size does not match grid dimensions".to_string());
    }

    let nodata = band
        .nodata
        .or_else(|| band.values.iter().any(|v| v.is_nan()).then_some(FALLBACK_NODATA));

    let mut out = String::new();
    let _ = writeln!(out, "ncols {}", data.cols);
    let _ = writeln!(out, "nrows {}", data.rows);
    let _ = writeln!(out, "xllcorner {}", data.origin[0]);
    let _ = writeln!(out, "yllcorner {}", data.origin[1]);
    if data.res_x == data.res_y {
        let _ = writeln!(out, "cellsize {}", data.res_x);
    } else {
        let _ = writeln!(out, "dx {}", data.res_x);
        let _ = writeln!(out, "dy {}", data.res_y);
    }
    if let Some(nodata) = nodata {
        let _ = writeln!(out, "NODATA_value {}", format_cell(nodata, data.data_type));
    }

    for row in band.values.chunks(data.cols.max(1)) {
        let cells: Vec<String> = row
            .iter()
            .map(|v| match nodata {
                Some(nd) if band.is_missing(*v) => format_cell(nd, data.data_type),
                _ => format_cell(*v, data.data_type),
            })
            .collect();
        let _ = writeln!(out, "{}", cells.join(" "));
    }
    Ok(out)
}

fn format_cell(value: f64, data_type: RasterDataType) -> String {
    match data_type {
        RasterDataType::Int32 if value.is_finite() => format!("{}", value.round() as i64),
        _ => format!("{:?}", value),
    }
}
