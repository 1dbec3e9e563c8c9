//! Spherical-earth point arithmetic.
//!
//! All distances and altitudes are in feet, all angles in degrees. The earth
//! is modelled as a sphere of radius [`EARTH_RADIUS_FT`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean earth radius in feet.
pub const EARTH_RADIUS_FT: f64 = 20_925_524.9;

/// Meters per foot.
pub const METERS_PER_FOOT: f64 = 0.3048;

/// Convert feet to meters.
pub fn feet_to_meters(feet: f64) -> f64 {
    feet * METERS_PER_FOOT
}

/// Shortest signed turn from `heading2` to `heading1`, in `(-180, 180]`.
///
/// Positive values are clockwise (right) turns.
pub fn heading_diff(heading1: f64, heading2: f64) -> f64 {
    let diff = (heading1 - heading2 + 180.0).rem_euclid(360.0) - 180.0;
    if diff <= -180.0 {
        diff + 360.0
    } else {
        diff
    }
}

/// Wrap `value` into `[0, period)`.
///
/// `rem_euclid` can round tiny negative inputs up to exactly `period`.
fn wrap(value: f64, period: f64) -> f64 {
    let wrapped = value.rem_euclid(period);
    if wrapped >= period {
        0.0
    } else {
        wrapped
    }
}

/// An immutable point on the earth: latitude and longitude in degrees,
/// altitude in feet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, alias = "alt")]
    pub altitude_ft: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64, altitude_ft: f64) -> Self {
        Self {
            lat,
            lon,
            altitude_ft,
        }
    }

    /// Distance in feet using the spherical law of cosines.
    ///
    /// The arc is measured on a sphere raised to the lower of the two
    /// altitudes, then combined with the altitude difference as the
    /// hypotenuse of a right triangle.
    pub fn distance(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lon1 = self.lon.to_radians();
        let lat2 = other.lat.to_radians();
        let lon2 = other.lon.to_radians();

        let v = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * (lon1 - lon2).cos();
        let radius = EARTH_RADIUS_FT + self.altitude_ft.min(other.altitude_ft);
        let arc = v.clamp(-1.0, 1.0).acos() * radius;

        arc.hypot(self.altitude_ft - other.altitude_ft)
    }

    /// Distance in feet using the haversine formula at sea-level radius,
    /// combined with the altitude difference like [`GeoPoint::distance`].
    pub fn distance_haversine(&self, other: &GeoPoint) -> f64 {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let dphi = phi2 - phi1;
        let dlambda = (other.lon - self.lon).to_radians();

        let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        (EARTH_RADIUS_FT * c).hypot(self.altitude_ft - other.altitude_ft)
    }

    /// Initial bearing towards `other` in `[0, 360)`. 0 is north, 90 east.
    pub fn bearing(&self, other: &GeoPoint) -> f64 {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let dlambda = (other.lon - self.lon).to_radians();

        let y = dlambda.sin() * phi2.cos();
        let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();

        wrap(y.atan2(x).to_degrees(), 360.0)
    }

    /// The point reached by travelling `distance_ft` along `bearing_deg`.
    ///
    /// Negative distances travel backwards. Altitude is carried over and the
    /// resulting longitude is normalized into `[-180, 180)`.
    pub fn destination(&self, bearing_deg: f64, distance_ft: f64) -> GeoPoint {
        let theta = bearing_deg.to_radians();
        let d = distance_ft / EARTH_RADIUS_FT;
        let phi1 = self.lat.to_radians();
        let lambda1 = self.lon.to_radians();

        let phi2 = (phi1.sin() * d.cos() + phi1.cos() * d.sin() * theta.cos()).asin();
        let lambda2 = lambda1
            + (theta.sin() * d.sin() * phi1.cos()).atan2(d.cos() - phi1.sin() * phi2.sin());
        let lambda2 = wrap(lambda2 + std::f64::consts::PI, 2.0 * std::f64::consts::PI)
            - std::f64::consts::PI;

        GeoPoint::new(phi2.to_degrees(), lambda2.to_degrees(), self.altitude_ft)
    }

    /// Component-wise linear interpolation; `t = 0` is `self`, `t = 1` is
    /// `other`. Not a great-circle path.
    pub fn interpolate(&self, other: &GeoPoint, t: f64) -> GeoPoint {
        fn lerp(start: f64, end: f64, t: f64) -> f64 {
            start + (end - start) * t
        }

        GeoPoint::new(
            lerp(self.lat, other.lat, t),
            lerp(self.lon, other.lon, t),
            lerp(self.altitude_ft, other.altitude_ft, t),
        )
    }

    /// Same horizontal position, ignoring altitude.
    pub fn same_position(&self, other: &GeoPoint) -> bool {
        self.lat == other.lat && self.lon == other.lon
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.6}, {:.6}, {:.0} ft)",
            self.lat, self.lon, self.altitude_ft
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INNSBRUCK: GeoPoint = GeoPoint {
        lat: 47.258888,
        lon: 11.3317,
        altitude_ft: 1907.0,
    };

    #[test]
    fn distance_to_self_is_zero() {
        // acos near 1 amplifies a one-ulp error in the cosine to a fraction of a foot
        assert!(INNSBRUCK.distance(&INNSBRUCK) < 0.5);
        assert_eq!(INNSBRUCK.distance_haversine(&INNSBRUCK), 0.0);

        let equator = GeoPoint::new(0.0, 0.0, 0.0);
        assert_eq!(equator.distance(&equator), 0.0);
    }

    #[test]
    fn one_degree_of_latitude() {
        let a = GeoPoint::new(0.0, 0.0, 0.0);
        let b = GeoPoint::new(1.0, 0.0, 0.0);
        let expected = EARTH_RADIUS_FT * 1f64.to_radians();
        assert!((a.distance(&b) - expected).abs() < 1e-3);
        assert!((a.distance_haversine(&b) - expected).abs() < 1e-3);
    }

    #[test]
    fn distances_are_symmetric() {
        let other = GeoPoint::new(47.261625, 11.357035, 3500.0);
        assert!((INNSBRUCK.distance(&other) - other.distance(&INNSBRUCK)).abs() < 1e-6);
        assert!(
            (INNSBRUCK.distance_haversine(&other) - other.distance_haversine(&INNSBRUCK)).abs()
                < 1e-6
        );
    }

    #[test]
    fn distance_uses_lower_altitude_for_radius() {
        let ground = GeoPoint::new(10.0, 10.0, 0.0);
        let high = GeoPoint::new(10.01, 10.0, 5000.0);
        let low_alt_arc = GeoPoint::new(10.0, 10.0, 0.0).distance(&GeoPoint::new(10.01, 10.0, 0.0));
        let expected = low_alt_arc.hypot(5000.0);
        assert!((ground.distance(&high) - expected).abs() < 1e-6);
    }

    #[test]
    fn distances_differ_in_radius_treatment() {
        let a = GeoPoint::new(10.0, 10.0, 30_000.0);
        let b = GeoPoint::new(10.5, 10.5, 30_000.0);
        assert!(a.distance(&b) > a.distance_haversine(&b));
    }

    #[test]
    fn destination_travels_requested_distance() {
        for bearing in [0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 359.0] {
            let dest = INNSBRUCK.destination(bearing, 1000.0);
            let dist = INNSBRUCK.distance(&dest);
            assert!(
                (dist - 1000.0).abs() < 0.5,
                "bearing {bearing}: expected ~1000 ft, got {dist}"
            );
            assert_eq!(dest.altitude_ft, INNSBRUCK.altitude_ft);
        }
    }

    #[test]
    fn destination_wraps_longitude() {
        let near_dateline = GeoPoint::new(0.0, 179.9999, 0.0);
        let dest = near_dateline.destination(90.0, 1000.0);
        assert!(dest.lon < -179.0, "expected wrap to western hemisphere, got {}", dest.lon);
        assert!(dest.lon >= -180.0);
    }

    #[test]
    fn reciprocal_bearings_on_meridian() {
        let north = GeoPoint::new(47.3, 11.3317, 0.0);
        let fwd = INNSBRUCK.bearing(&north);
        let back = north.bearing(&INNSBRUCK);
        assert!(fwd.abs() < 1e-9);
        assert!((heading_diff(back, fwd).abs() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn bearing_is_normalized() {
        let west = GeoPoint::new(INNSBRUCK.lat, INNSBRUCK.lon - 0.01, 0.0);
        let bearing = INNSBRUCK.bearing(&west);
        assert!((0.0..360.0).contains(&bearing));
        assert!((bearing - 270.0).abs() < 0.01);
    }

    #[test]
    fn interpolate_endpoints() {
        let other = GeoPoint::new(47.261625, 11.357035, 3500.0);
        assert_eq!(INNSBRUCK.interpolate(&other, 0.0), INNSBRUCK);

        let end = INNSBRUCK.interpolate(&other, 1.0);
        assert!((end.lat - other.lat).abs() < 1e-12);
        assert!((end.lon - other.lon).abs() < 1e-12);
        assert!((end.altitude_ft - other.altitude_ft).abs() < 1e-9);

        let mid = INNSBRUCK.interpolate(&other, 0.5);
        assert!((mid.altitude_ft - 2703.5).abs() < 1e-9);
    }

    #[test]
    fn heading_diff_range() {
        assert_eq!(heading_diff(10.0, 350.0), 20.0);
        assert_eq!(heading_diff(350.0, 10.0), -20.0);
        assert_eq!(heading_diff(90.0, 270.0), 180.0);
        assert_eq!(heading_diff(270.0, 90.0), 180.0);
        assert_eq!(heading_diff(45.0, 45.0), 0.0);
    }

    #[test]
    fn feet_conversion() {
        assert!((feet_to_meters(1000.0) - 304.8).abs() < 1e-9);
    }
}
