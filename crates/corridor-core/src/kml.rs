//! KML export for viewing routes and corridors in Google Earth.

use std::fmt::Write;

use crate::geo::feet_to_meters;
use crate::route::Route;

/// Render `route` as a KML polygon. Usually called on a corridor polygon.
///
/// Coordinates are written as `lon,lat,alt_m`. With `extrude_from_ground`
/// the polygon is extended down to the ground.
pub fn to_kml(route: &Route, extrude_from_ground: bool) -> String {
    let mut coordinates = String::new();
    for v in route.vertices() {
        // writing into a String cannot fail
        let _ = writeln!(
            coordinates,
            "{},{},{}",
            v.lon,
            v.lat,
            feet_to_meters(v.altitude_ft)
        );
    }

    let extrude = if extrude_from_ground {
        "        <extrude>1</extrude>\n"
    } else {
        ""
    };

    format!(
        r##"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>

    <Style id="yellowLineGreenPoly">
      <LineStyle>
        <color>5f00ffff</color>
        <width>4</width>
      </LineStyle>
      <PolyStyle>
        <color>5f00ff00</color>
      </PolyStyle>
    </Style>

    <Placemark>
      <name>Flight path</name>
      <description>Flight path</description>
      <styleUrl>#yellowLineGreenPoly</styleUrl>
      <Polygon>
{extrude}        <altitudeMode>absolute</altitudeMode>
        <outerBoundaryIs>
        <LinearRing>
        <coordinates>
{coordinates}        </coordinates>
        </LinearRing>
        </outerBoundaryIs>
      </Polygon>
    </Placemark>
  </Document>
</kml>"##
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;

    fn square() -> Route {
        Route::from_points(vec![
            GeoPoint::new(47.0, 11.0, 10000.0),
            GeoPoint::new(47.0, 11.1, 10000.0),
            GeoPoint::new(47.1, 11.1, 10000.0),
            GeoPoint::new(47.0, 11.0, 10000.0),
        ])
        .unwrap()
    }

    #[test]
    fn writes_lon_lat_meters() {
        let kml = to_kml(&square(), false);
        assert!(kml.contains("<coordinates>\n11,47,3048\n11.1,47,3048\n"));
        assert!(kml.contains("<altitudeMode>absolute</altitudeMode>"));
        assert!(!kml.contains("<extrude>"));
        assert!(kml.trim_end().ends_with("</kml>"));
    }

    #[test]
    fn extrude_flag() {
        let kml = to_kml(&square(), true);
        assert!(kml.contains("<Polygon>\n        <extrude>1</extrude>\n        <altitudeMode>"));
    }
}
