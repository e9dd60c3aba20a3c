//! Defines a validated balloon position and the rules that turn a raw snapshot
//! sample into one.

use crate::types::lat_lon::LatLon;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The last hour offset a snapshot can carry (hour 0 is the most recent).
pub const LAST_HOUR: u8 = 23;

/// A single validated balloon observation.
///
/// Positions are plain values: once validated they are never changed, and the
/// reconstruction and coverage stages only ever copy them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Latitude in decimal degrees, within `[-90, 90]`.
    pub latitude: f64,
    /// Longitude in decimal degrees, within `[-180, 180]`.
    pub longitude: f64,
    /// Altitude in kilometers, never negative.
    pub altitude: f64,
    /// Hours before the snapshot set was fetched, within `[0, 23]`.
    pub hour: u8,
    /// Approximate observation time, `fetched_at - hour`.
    pub timestamp: DateTime<Utc>,
}

/// Why a raw sample was refused. Rejected samples are dropped, never repaired.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleRejection {
    #[error("sample is not a JSON array")]
    NotAnArray,

    #[error("sample has {0} fields, expected 3")]
    WrongArity(usize),

    #[error("field {0} of sample is not a number")]
    NonNumeric(usize),

    #[error("sample contains a non-finite value")]
    NonFinite,

    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("altitude {0} is negative")]
    NegativeAltitude(f64),

    #[error("hour {0} outside [0, 23]")]
    HourOutOfRange(u8),
}

impl Position {
    /// Creates a position after checking every field against its valid range.
    pub fn new(
        latitude: f64,
        longitude: f64,
        altitude: f64,
        hour: u8,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, SampleRejection> {
        if !(latitude.is_finite() && longitude.is_finite() && altitude.is_finite()) {
            return Err(SampleRejection::NonFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(SampleRejection::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(SampleRejection::LongitudeOutOfRange(longitude));
        }
        if altitude < 0.0 {
            return Err(SampleRejection::NegativeAltitude(altitude));
        }
        if hour > LAST_HOUR {
            return Err(SampleRejection::HourOutOfRange(hour));
        }
        Ok(Self {
            latitude,
            longitude,
            altitude,
            hour,
            timestamp,
        })
    }

    /// Validates one raw snapshot entry of the form `[lat, lon, alt]`.
    ///
    /// The timestamp is derived from the time the snapshot set was fetched,
    /// shifted back by `hour` hours.
    pub fn from_raw(
        raw: &Value,
        hour: u8,
        fetched_at: DateTime<Utc>,
    ) -> Result<Self, SampleRejection> {
        let fields = raw.as_array().ok_or(SampleRejection::NotAnArray)?;
        if fields.len() != 3 {
            return Err(SampleRejection::WrongArity(fields.len()));
        }
        let mut values = [0.0_f64; 3];
        for (i, field) in fields.iter().enumerate() {
            values[i] = field.as_f64().ok_or(SampleRejection::NonNumeric(i))?;
        }
        let timestamp = fetched_at - Duration::hours(i64::from(hour));
        Self::new(values[0], values[1], values[2], hour, timestamp)
    }

    pub fn lat_lon(&self) -> LatLon {
        LatLon(self.latitude, self.longitude)
    }
}
