//! Procedural route generation.
//!
//! A [`RouteBuilder`] walks a pen over the earth: each [`RouteBuilder::advance`]
//! splits a leg into steps of roughly [`DEFAULT_STEP_FT`], turning, climbing
//! and widening the corridor a little on every step and recording a vertex
//! after each one. [`generate`] strings legs together into the standard
//! airfield patterns (ground roll, takeoff, traffic circuit, flyover).

use crate::error::InvalidRouteError;
use crate::geo::GeoPoint;
use crate::route::Route;

/// Target length of one generated segment, in feet.
pub const DEFAULT_STEP_FT: f64 = 200.0;

/// Distance before the runway threshold where the ground roll starts.
const LINE_UP_FT: f64 = 120.0;

/// Incrementally builds a tolerance-annotated route.
#[derive(Debug, Clone)]
pub struct RouteBuilder {
    position: GeoPoint,
    bearing: f64,
    tolerance: f64,
    step_ft: f64,
    vertices: Vec<GeoPoint>,
    tolerances: Vec<f64>,
}

impl RouteBuilder {
    /// Start at `start`, heading `bearing` degrees with a corridor half-width
    /// of `tolerance` feet. Nothing is recorded until [`mark`](Self::mark)
    /// or [`advance`](Self::advance).
    pub fn new(start: GeoPoint, bearing: f64, tolerance: f64) -> Self {
        Self {
            position: start,
            bearing,
            tolerance,
            step_ft: DEFAULT_STEP_FT,
            vertices: Vec::new(),
            tolerances: Vec::new(),
        }
    }

    pub fn with_step(mut self, step_ft: f64) -> Self {
        self.step_ft = step_ft;
        self
    }

    pub fn position(&self) -> GeoPoint {
        self.position
    }

    pub fn bearing(&self) -> f64 {
        self.bearing
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Record the current position with the current tolerance.
    pub fn mark(&mut self) -> &mut Self {
        self.vertices.push(self.position);
        self.tolerances.push(self.tolerance);
        self
    }

    pub fn set_tolerance(&mut self, tolerance: f64) -> &mut Self {
        self.tolerance = tolerance;
        self
    }

    /// Move to `point` without recording anything in between.
    pub fn jump_to(&mut self, point: GeoPoint) -> &mut Self {
        self.position = point;
        self
    }

    /// Turn towards `point`.
    pub fn head_towards(&mut self, point: &GeoPoint) -> &mut Self {
        self.bearing = self.position.bearing(point);
        self
    }

    /// Fly a leg of `distance_ft`, spreading the altitude, bearing and
    /// tolerance gains evenly over its steps. Every step records a vertex.
    pub fn advance(
        &mut self,
        distance_ft: f64,
        altitude_gain_ft: f64,
        bearing_gain_deg: f64,
        tolerance_gain_ft: f64,
    ) -> &mut Self {
        let steps = (distance_ft.abs() / self.step_ft).round().max(1.0);
        let step = distance_ft / steps;

        for _ in 0..steps as usize {
            self.bearing += bearing_gain_deg / steps;
            self.tolerance += tolerance_gain_ft / steps;
            let mut next = self.position.destination(self.bearing, step);
            next.altitude_ft += altitude_gain_ft / steps;
            self.position = next;
            self.mark();
        }
        self
    }

    pub fn build(&self) -> Result<Route, InvalidRouteError> {
        Route::new(self.vertices.clone(), self.tolerances.clone())
    }
}

/// Runway endpoints; takeoff runs from `start` towards `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Runway {
    pub start: GeoPoint,
    pub end: GeoPoint,
}

/// Parameters shared by every pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternParams {
    /// Corridor half-width on the runway.
    pub tolerance_ft: f64,
    pub ground_run_ft: f64,
    /// Height of the traffic circuit above the runway.
    pub circuit_altitude_ft: f64,
    /// Extra corridor width added during the climb out and removed on final.
    pub extra_tolerance_ft: f64,
    /// Turn of each circuit corner; positive is a right-hand circuit.
    pub turn_deg: f64,
}

impl Default for PatternParams {
    fn default() -> Self {
        Self {
            tolerance_ft: 100.0,
            ground_run_ft: 1900.0,
            circuit_altitude_ft: 1000.0,
            extra_tolerance_ft: 500.0,
            turn_deg: 90.0,
        }
    }
}

/// Generated route shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pattern {
    /// Ground roll along the runway.
    Roll,
    /// Roll followed by the initial climb.
    Takeoff,
    /// Takeoff, crosswind and downwind, ending abeam the runway.
    Partial,
    /// Full traffic circuit back onto the runway.
    Circuit,
    /// A circuit too tight to fly.
    Impossible,
    /// Takeoff, then a straight leg from `start` to `end`.
    Flyover {
        start: GeoPoint,
        end: GeoPoint,
        tolerance_ft: f64,
        turn_deg: f64,
    },
}

/// Build the route for `pattern` departing from `runway`.
pub fn generate(
    runway: &Runway,
    pattern: &Pattern,
    params: &PatternParams,
) -> Result<Route, InvalidRouteError> {
    let alt = params.circuit_altitude_ft;
    let turn = params.turn_deg;
    let mut builder = roll(runway, params);

    match *pattern {
        Pattern::Roll => {}
        Pattern::Takeoff => {
            climb_out(&mut builder, params);
        }
        Pattern::Partial => {
            climb_out(&mut builder, params);
            crosswind(&mut builder, alt, turn)
                .advance(params.ground_run_ft + 2000.0, 0.0, 0.0, 0.0);
        }
        Pattern::Circuit => {
            climb_out(&mut builder, params);
            crosswind(&mut builder, alt, turn)
                .advance(params.ground_run_ft + 3900.0, 0.0, 0.0, 0.0)
                .advance(2000.0, -0.2 * alt, turn, 0.0)
                .advance(2700.0, -0.3 * alt, 0.0, 0.0)
                .advance(2000.0, -0.2 * alt, turn, 0.0)
                .advance(2700.0, -0.3 * alt, 0.0, -params.extra_tolerance_ft)
                .advance(500.0, 0.0, 0.0, 0.0);
        }
        Pattern::Impossible => {
            climb_out(&mut builder, params);
            builder
                .advance(1000.0, 0.2 * alt, turn / 2.0, 0.0)
                .advance(925.0, 0.0, 0.0, 0.0)
                .advance(1000.0, -0.1 * alt, -turn / 2.0, 0.0)
                .advance(900.0, -0.1 * alt, 0.0, 0.0)
                .advance(2200.0, -0.2 * alt, -2.0 * turn, 0.0)
                .advance(900.0, -0.1 * alt, 0.0, -params.extra_tolerance_ft)
                .advance(200.0, 0.0, 0.0, 0.0);
        }
        Pattern::Flyover {
            start,
            end,
            tolerance_ft,
            turn_deg,
        } => {
            climb_out(&mut builder, params);
            if turn_deg != 0.0 {
                builder.advance(2000.0, 0.2 * alt, turn_deg, 0.0);
            }
            // unbounded transit to the flyover start
            builder
                .set_tolerance(0.0)
                .mark()
                .jump_to(start)
                .mark()
                .set_tolerance(tolerance_ft)
                .mark()
                .head_towards(&end)
                .advance(start.distance(&end), 0.0, 0.0, 0.0);
        }
    }

    let route = builder.build()?;
    tracing::debug!(
        ?pattern,
        vertices = route.vertices().len(),
        total_distance_ft = route.total_distance(),
        "generated route"
    );
    Ok(route)
}

fn roll(runway: &Runway, params: &PatternParams) -> RouteBuilder {
    let bearing = runway.start.bearing(&runway.end);
    let start = runway.start.destination(bearing, -LINE_UP_FT);
    let mut builder = RouteBuilder::new(start, bearing, params.tolerance_ft);
    builder.mark().advance(params.ground_run_ft, 0.0, 0.0, 0.0);
    builder
}

fn climb_out<'a>(builder: &'a mut RouteBuilder, params: &PatternParams) -> &'a mut RouteBuilder {
    builder.advance(
        1500.0,
        0.3 * params.circuit_altitude_ft,
        0.0,
        params.extra_tolerance_ft,
    )
}

/// Crosswind turn, crosswind leg and the turn onto downwind.
fn crosswind(builder: &mut RouteBuilder, alt: f64, turn: f64) -> &mut RouteBuilder {
    builder
        .advance(2000.0, 0.2 * alt, turn, 0.0)
        .advance(2700.0, 0.3 * alt, 0.0, 0.0)
        .advance(2000.0, 0.2 * alt, turn, 0.0)
}
