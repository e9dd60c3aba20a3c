//! Defines the reference (ground) station record used as the coverage baseline.

use crate::types::lat_lon::LatLon;
use serde::{Deserialize, Serialize};

/// A ground station from the reference station list.
///
/// Stations are loaded once, already validated and deduplicated by
/// [`crate::StationLoader`], and are never modified afterwards.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceStation {
    /// The station identifier as it appears in the station list (e.g. "USM00072201").
    pub id: String,
    /// Human readable station name.
    pub name: String,
    /// Country code, taken from the first two characters of the identifier.
    pub country: String,
    /// Latitude in decimal degrees (positive for North, negative for South).
    pub latitude: f64,
    /// Longitude in decimal degrees (positive for East, negative for West).
    pub longitude: f64,
    /// Elevation above sea level in meters, if reported.
    pub elevation: Option<f64>,
}

impl ReferenceStation {
    pub fn lat_lon(&self) -> LatLon {
        LatLon(self.latitude, self.longitude)
    }
}
