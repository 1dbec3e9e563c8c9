//! Routes: ordered, tolerance-annotated vertex sequences.

use serde::{Deserialize, Serialize};

use crate::error::InvalidRouteError;
use crate::geo::GeoPoint;

/// Positions along a segment are indices into `2^levels - 2` steps; finer
/// steps are not representable in an `f64` position.
const MAX_PROJECTION_LEVELS: u32 = 52;

/// An immutable route. Each vertex carries a corridor half-width in feet;
/// a tolerance of 0 means the corridor is unbounded there.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    vertices: Vec<GeoPoint>,
    tolerances: Vec<f64>,
}

impl Route {
    /// Build a route from vertices and their tolerances (feet).
    pub fn new(vertices: Vec<GeoPoint>, tolerances: Vec<f64>) -> Result<Self, InvalidRouteError> {
        if vertices.is_empty() {
            return Err(InvalidRouteError::Empty);
        }
        if vertices.len() != tolerances.len() {
            return Err(InvalidRouteError::ToleranceMismatch {
                vertices: vertices.len(),
                tolerances: tolerances.len(),
            });
        }
        Ok(Self {
            vertices,
            tolerances,
        })
    }

    /// Build a route with a zero (unbounded) tolerance at every vertex.
    pub fn from_points(vertices: Vec<GeoPoint>) -> Result<Self, InvalidRouteError> {
        let tolerances = vec![0.0; vertices.len()];
        Self::new(vertices, tolerances)
    }

    /// Build a route from its wire definition. An empty definition means
    /// there is no active route.
    pub fn from_definition(definition: &RouteDefinition) -> Result<Option<Self>, InvalidRouteError> {
        if definition.0.is_empty() {
            return Ok(None);
        }
        let (vertices, tolerances) = definition
            .0
            .iter()
            .map(|&[lat, lon, alt, tol]| (GeoPoint::new(lat, lon, alt), tol))
            .unzip();
        Self::new(vertices, tolerances).map(Some)
    }

    pub fn to_definition(&self) -> RouteDefinition {
        RouteDefinition(
            self.vertices
                .iter()
                .zip(&self.tolerances)
                .map(|(v, &tol)| [v.lat, v.lon, v.altitude_ft, tol])
                .collect(),
        )
    }

    pub fn vertices(&self) -> &[GeoPoint] {
        &self.vertices
    }

    pub fn tolerances(&self) -> &[f64] {
        &self.tolerances
    }

    pub fn first(&self) -> &GeoPoint {
        &self.vertices[0]
    }

    pub fn last(&self) -> &GeoPoint {
        &self.vertices[self.vertices.len() - 1]
    }

    /// Number of segments (one less than the number of vertices).
    pub fn segment_count(&self) -> usize {
        self.vertices.len() - 1
    }

    /// The `i`th segment, spanning vertices `i` and `i + 1`.
    pub fn segment(&self, i: usize) -> Result<Segment, InvalidRouteError> {
        if i >= self.segment_count() {
            return Err(InvalidRouteError::SegmentOutOfRange {
                index: i,
                segments: self.segment_count(),
            });
        }
        Ok(Segment {
            start: self.vertices[i],
            end: self.vertices[i + 1],
            tolerances: [self.tolerances[i], self.tolerances[i + 1]],
        })
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.vertices
            .windows(2)
            .zip(self.tolerances.windows(2))
            .map(|(v, t)| Segment {
                start: v[0],
                end: v[1],
                tolerances: [t[0], t[1]],
            })
    }

    /// Sum of the vertex-to-vertex distances, in feet. Zero for a single
    /// vertex route.
    pub fn total_distance(&self) -> f64 {
        self.vertices.windows(2).map(|v| v[0].distance(&v[1])).sum()
    }

    /// Point at a global position: the integer part selects the segment, the
    /// fractional part interpolates within it. Positions outside
    /// `[0, segment_count]` clamp to the first or last vertex, as does NaN.
    pub fn interpolate(&self, position: f64) -> GeoPoint {
        if position.is_nan() || position <= 0.0 {
            return *self.first();
        }
        if position >= self.segment_count() as f64 {
            return *self.last();
        }
        let i = position.floor();
        let index = i as usize;
        self.vertices[index].interpolate(&self.vertices[index + 1], position - i)
    }
}

/// Wire form of a route: `[lat, lon, altitude_ft, tolerance_ft]` per vertex.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteDefinition(pub Vec<[f64; 4]>);

impl RouteDefinition {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Nearest point found on a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Normalized position along the segment, in `[0, 1]`.
    pub position: f64,
    /// Distance in feet from the projected point to the segment at `position`.
    pub distance_ft: f64,
}

/// Two consecutive route vertices and their tolerances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub tolerances: [f64; 2],
}

impl Segment {
    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }

    pub fn max_tolerance(&self) -> f64 {
        self.tolerances[0].max(self.tolerances[1])
    }

    /// Both endpoint tolerances are zero.
    pub fn is_unbounded(&self) -> bool {
        self.tolerances[0] == 0.0 && self.tolerances[1] == 0.0
    }

    /// Whether a point `distance_ft` away lies inside this segment's corridor.
    pub fn accepts(&self, distance_ft: f64) -> bool {
        self.is_unbounded() || distance_ft <= self.max_tolerance()
    }

    /// Find the position along the segment closest to `point`.
    ///
    /// The segment is discretized into `2^levels - 2` steps, with `levels`
    /// chosen from the segment length in feet. Starting at the middle index,
    /// each step compares the distance at `index` and `index + 1` and moves
    /// towards the smaller one by a halving span. Assumes the distance is
    /// unimodal along the segment.
    pub fn project(&self, point: &GeoPoint) -> Projection {
        let levels = (self.length().max(4.0).log2().ceil() as u32).min(MAX_PROJECTION_LEVELS);
        let discretization = ((1u64 << levels) - 2) as f64;
        let mut span: i64 = 1 << (levels - 2);
        let mut index: i64 = (1 << (levels - 1)) - 1;

        let distance_at = |index: i64| {
            point.distance(&self.start.interpolate(&self.end, index as f64 / discretization))
        };

        while span > 0 {
            if distance_at(index) < distance_at(index + 1) {
                index -= span;
            } else {
                index += span;
            }
            span >>= 1;
        }

        Projection {
            position: index as f64 / discretization,
            distance_ft: distance_at(index),
        }
    }

    /// The equivalent two-vertex route.
    pub fn to_route(&self) -> Route {
        Route {
            vertices: vec![self.start, self.end],
            tolerances: self.tolerances.to_vec(),
        }
    }
}
