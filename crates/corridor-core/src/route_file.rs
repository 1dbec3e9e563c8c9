//! Route CSV files.
//!
//! One vertex per row: `lat,lon[,altitude_ft[,tolerance_ft]]`.
//!
//! ```csv
//! lat,lon,alt,tol
//! 47.258888,11.331700,1907,200
//! 47.261625,11.357035,2500,300
//! ```
//!
//! Rows with fewer than two fields and rows starting with a letter (headers)
//! are skipped. Missing altitudes and tolerances default to 0.

use std::io::{Read, Write};
use std::path::Path;

use crate::error::{InvalidRouteError, RouteFileError};
use crate::geo::GeoPoint;
use crate::route::Route;

/// Load a route from a CSV file.
pub fn load_route_csv(path: &Path) -> Result<Route, RouteFileError> {
    let file = std::fs::File::open(path)?;
    load_route_reader(file)
}

/// Like [`load_route_csv`] but accepts any `Read` source.
pub fn load_route_reader<R: Read>(reader: R) -> Result<Route, RouteFileError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut vertices = Vec::new();
    let mut tolerances = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        if record.len() < 2 {
            continue;
        }
        if record[0].starts_with(|c: char| c.is_alphabetic()) {
            continue;
        }
        let line = record.position().map_or(0, |p| p.line());

        let field = |index: usize, name: &'static str| -> Result<f64, RouteFileError> {
            match record.get(index) {
                None | Some("") => Ok(0.0),
                Some(value) => value.parse().map_err(|_| RouteFileError::Parse {
                    line,
                    field: name,
                    value: value.to_string(),
                }),
            }
        };

        vertices.push(GeoPoint::new(
            field(0, "latitude")?,
            field(1, "longitude")?,
            field(2, "altitude")?,
        ));
        tolerances.push(field(3, "tolerance")?);
    }

    if vertices.is_empty() {
        return Err(InvalidRouteError::Empty.into());
    }
    Ok(Route::new(vertices, tolerances)?)
}

/// Write `route` as CSV with a `lat,lon,alt,tol` header.
pub fn write_route_csv(route: &Route, path: &Path) -> Result<(), RouteFileError> {
    let file = std::fs::File::create(path)?;
    write_route_writer(route, file)
}

/// Like [`write_route_csv`] but accepts any `Write` sink.
pub fn write_route_writer<W: Write>(route: &Route, writer: W) -> Result<(), RouteFileError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["lat", "lon", "alt", "tol"])?;
    for (v, tol) in route.vertices().iter().zip(route.tolerances()) {
        csv_writer.write_record([
            v.lat.to_string(),
            v.lon.to_string(),
            v.altitude_ft.to_string(),
            tol.to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}
