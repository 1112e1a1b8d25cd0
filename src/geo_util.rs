//! Great-circle distance between geographic coordinates.
//!
//! Kept hand-rolled rather than routed through a generic geodesy crate's own
//! mean-radius constant, since the radius is part of this system's observable
//! behaviour (route curvature, fallback road distances) and has to be the
//! literal value below, not whatever a dependency happens to ship.

use geo_types::Point;

/// Mean Earth radius in meters, as used by the haversine formula below.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle (haversine) distance in meters between two points.
///
/// `point` is stored `(longitude, latitude)` to match `geo_types::Point`'s
/// `x`/`y` convention; both arguments are in degrees.
pub fn haversine_distance(a: Point<f64>, b: Point<f64>) -> f64 {
    let (lat1, lon1) = (a.y().to_radians(), a.x().to_radians());
    let (lat2, lon2) = (b.y().to_radians(), b.x().to_radians());

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}
