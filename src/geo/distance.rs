use crate::types::lat_lon::LatLon;
use haversine::{distance, Location as HaversineLocation, Units};
use std::f64::consts::PI;

/// Mean Earth radius used by the great-circle distance, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle (haversine) distance between two coordinates in kilometers.
///
/// Symmetric, zero for identical coordinates, and continuous across the
/// antimeridian since both points are taken in signed-degree form. For
/// (near-)antipodal points rounding can push the haversine term past 1, which
/// the underlying formula turns into NaN; those return half the circumference.
///
/// # Examples
///
/// ```
/// use balloon_coverage::{distance_km, LatLon};
///
/// let d = distance_km(LatLon(0.0, 179.5), LatLon(0.0, -179.5));
/// assert!((d - 111.19).abs() < 0.1);
/// ```
pub fn distance_km(a: LatLon, b: LatLon) -> f64 {
    let d = distance(
        HaversineLocation {
            latitude: a.0,
            longitude: a.1,
        },
        HaversineLocation {
            latitude: b.0,
            longitude: b.1,
        },
        Units::Kilometers,
    );
    let finite_input = [a.0, a.1, b.0, b.1].iter().all(|v| v.is_finite());
    if d.is_nan() && finite_input {
        PI * EARTH_RADIUS_KM
    } else {
        d
    }
}
