//! Coarse land/ocean classification.
//!
//! The default classifier only knows six rectangular continental boxes. Islands,
//! Antarctica and any land outside the boxes come out as ocean; that is a known
//! limitation of the approximation. Swap in a finer [`SurfaceClassifier`] if it
//! matters.

use serde::{Deserialize, Serialize};

/// What lies underneath a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Surface {
    Land,
    Ocean,
}

/// Anything that can tell land from ocean for a coordinate.
///
/// Implementations must be deterministic and total over the valid coordinate
/// range, and cheap enough to call once per sample.
pub trait SurfaceClassifier: Send + Sync {
    fn classify(&self, latitude: f64, longitude: f64) -> Surface;

    fn is_over_ocean(&self, latitude: f64, longitude: f64) -> bool {
        self.classify(latitude, longitude) == Surface::Ocean
    }
}

/// A named, inclusive latitude/longitude rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub name: &'static str,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&latitude)
            && (self.min_lon..=self.max_lon).contains(&longitude)
    }
}

pub const CONTINENT_BOXES: [BoundingBox; 6] = [
    BoundingBox {
        name: "North America",
        min_lat: 15.0,
        max_lat: 72.0,
        min_lon: -170.0,
        max_lon: -50.0,
    },
    BoundingBox {
        name: "South America",
        min_lat: -56.0,
        max_lat: 13.0,
        min_lon: -82.0,
        max_lon: -34.0,
    },
    BoundingBox {
        name: "Europe",
        min_lat: 36.0,
        max_lat: 71.0,
        min_lon: -10.0,
        max_lon: 40.0,
    },
    BoundingBox {
        name: "Africa",
        min_lat: -35.0,
        max_lat: 37.0,
        min_lon: -18.0,
        max_lon: 52.0,
    },
    BoundingBox {
        name: "Asia",
        min_lat: 5.0,
        max_lat: 77.0,
        min_lon: 40.0,
        max_lon: 180.0,
    },
    BoundingBox {
        name: "Australia",
        min_lat: -44.0,
        max_lat: -10.0,
        min_lon: 113.0,
        max_lon: 154.0,
    },
];

/// The default classifier: land iff inside one of [`CONTINENT_BOXES`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ContinentBoxes;

impl ContinentBoxes {
    /// Name of the first continental box containing the coordinate, if any.
    pub fn continent(&self, latitude: f64, longitude: f64) -> Option<&'static str> {
        CONTINENT_BOXES
            .iter()
            .find(|b| b.contains(latitude, longitude))
            .map(|b| b.name)
    }
}

impl SurfaceClassifier for ContinentBoxes {
    fn classify(&self, latitude: f64, longitude: f64) -> Surface {
        match self.continent(latitude, longitude) {
            Some(_) => Surface::Land,
            None => Surface::Ocean,
        }
    }
}

/// Shorthand for [`ContinentBoxes`]: `true` when the coordinate is outside every
/// continental box.
pub fn is_over_ocean(latitude: f64, longitude: f64) -> bool {
    ContinentBoxes.is_over_ocean(latitude, longitude)
}
