//! Navigation geometry and route following for tolerance corridors.
//!
//! Points live on a spherical earth ([`GeoPoint`]), routes are ordered
//! vertices with a corridor half-width at each one ([`Route`]), and a
//! [`RouteFollower`] decides per tracked entity whether a stream of position
//! samples stays inside the corridor and how far along the route it got.

pub mod corridor;
pub mod error;
pub mod follower;
pub mod geo;
pub mod kml;
pub mod route;
pub mod route_builder;
pub mod route_file;

pub use error::{InvalidRouteError, RouteFileError};
pub use follower::{CourseStatus, FollowerReport, RouteFollower, TrackWindow};
pub use geo::{feet_to_meters, heading_diff, GeoPoint, EARTH_RADIUS_FT};
pub use kml::to_kml;
pub use route::{Projection, Route, RouteDefinition, Segment};
pub use route_builder::{generate, Pattern, PatternParams, RouteBuilder, Runway};
pub use route_file::{load_route_csv, load_route_reader, write_route_csv, write_route_writer};
