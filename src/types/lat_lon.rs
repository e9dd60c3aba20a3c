use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
/// Both values are signed decimal degrees.
///
/// # Examples
///
/// ```
/// use balloon_coverage::LatLon;
///
/// let hilo = LatLon(19.7297, -155.09);
/// assert_eq!(hilo.0, 19.7297); // Latitude
/// assert_eq!(hilo.1, -155.09); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon(pub f64, pub f64);

impl LatLon {
    pub fn latitude(self) -> f64 {
        self.0
    }

    pub fn longitude(self) -> f64 {
        self.1
    }
}
