//! Error types for route construction and route file loading.

use thiserror::Error;

/// A route that cannot be built or cannot support the requested operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidRouteError {
    #[error("route has no vertices")]
    Empty,

    #[error("route has {vertices} vertices but {tolerances} tolerances")]
    ToleranceMismatch { vertices: usize, tolerances: usize },

    #[error("route needs at least {needed} vertices, found {found}")]
    TooFewVertices { needed: usize, found: usize },

    #[error("segment {index} out of range for route with {segments} segments")]
    SegmentOutOfRange { index: usize, segments: usize },
}

/// Failure while reading a route from a CSV file.
#[derive(Debug, Error)]
pub enum RouteFileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: invalid {field} value {value:?}")]
    Parse {
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error(transparent)]
    Route(#[from] InvalidRouteError),
}
