//! Tolerance corridor polygon around a route centerline.

use crate::error::InvalidRouteError;
use crate::geo::{heading_diff, GeoPoint};
use crate::route::Route;

/// Turns no sharper than this (degrees) are treated as straight.
const STRAIGHT_TURN_DEG: f64 = 1.0;

/// Half-turn clamp (degrees) for the inner miter correction.
const MAX_MITER_HALF_TURN_DEG: f64 = 60.0;

impl Route {
    /// Closed polygon bounding the tolerance corridor of this route.
    ///
    /// The left and right boundaries are offset by each vertex's tolerance
    /// perpendicular to the direction of travel. The start and end caps are
    /// squared off, turns get a three point bevel on the outer side and a
    /// single miter point on the inner side. The result starts and ends on
    /// the same point and carries zero tolerances.
    pub fn corridor_polygon(&self) -> Result<Route, InvalidRouteError> {
        let vertices = self.vertices();
        let tolerances = self.tolerances();
        if vertices.len() < 2 {
            return Err(InvalidRouteError::TooFewVertices {
                needed: 2,
                found: vertices.len(),
            });
        }

        let n = self.segment_count();
        let mut left: Vec<GeoPoint> = Vec::with_capacity(3 * n + 2);
        let mut right: Vec<GeoPoint> = Vec::with_capacity(3 * n + 2);
        let mut prev_bearing = 0.0;

        for i in 0..=n {
            let start = &vertices[i];
            let tol = tolerances[i];

            let bearing = if i == n {
                prev_bearing
            } else {
                let mut j = i + 1;
                while j < n && start.same_position(&vertices[j]) {
                    j += 1;
                }
                start.bearing(&vertices[j])
            };

            if i == 0 || i == n {
                if i == 0 {
                    left.push(start.destination(bearing, -tol));
                }
                left.push(start.destination(bearing - 90.0, tol));
                right.push(start.destination(bearing + 90.0, tol));
                if i == n {
                    right.push(start.destination(bearing, tol));
                }
            } else {
                let turn = heading_diff(bearing, prev_bearing);
                if turn.abs() <= STRAIGHT_TURN_DEG {
                    left.push(start.destination(bearing - 90.0, tol));
                    right.push(start.destination(bearing + 90.0, tol));
                } else {
                    let (angle, outer, inner) = if turn > 0.0 {
                        (prev_bearing - 90.0, &mut left, &mut right)
                    } else {
                        (prev_bearing + 90.0, &mut right, &mut left)
                    };
                    outer.push(start.destination(angle, tol));
                    outer.push(start.destination(angle + turn / 2.0, tol));
                    outer.push(start.destination(angle + turn, tol));

                    let half_turn = (turn / 2.0)
                        .clamp(-MAX_MITER_HALF_TURN_DEG, MAX_MITER_HALF_TURN_DEG)
                        .to_radians();
                    inner.push(start.destination(angle + turn / 2.0, -tol / half_turn.cos()));
                }
            }

            prev_bearing = bearing;
        }

        right.reverse();
        let closing = left[0];
        left.extend(right);
        left.push(closing);

        tracing::debug!(
            route_vertices = vertices.len(),
            polygon_vertices = left.len(),
            "built corridor polygon"
        );

        Route::from_points(left)
    }
}
