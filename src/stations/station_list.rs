//! Parser for the fixed-width reference station list.
//!
//! Layout (1-based columns, as in the IGRA2 station list):
//!
//! | Columns | Field                                   |
//! |---------|-----------------------------------------|
//! | 1-11    | ID, the first two characters are the country code |
//! | 13-20   | latitude                                |
//! | 22-30   | longitude                               |
//! | 32-37   | elevation in meters, -998.8 / -999.9 when missing |
//! | 39-40   | state                                   |
//! | 42-71   | name                                    |
//!
//! Lines that do not fit the layout are dropped. The first occurrence of an ID wins.

use crate::types::station::ReferenceStation;
use log::debug;
use std::collections::HashSet;
use std::ops::Range;

const ID: Range<usize> = 0..11;
const LATITUDE: Range<usize> = 12..20;
const LONGITUDE: Range<usize> = 21..30;
const ELEVATION: Range<usize> = 31..37;
const NAME: Range<usize> = 41..71;

/// Elevations at or below this are placeholders for "unknown".
const MISSING_ELEVATION: f64 = -998.0;

fn field(line: &str, range: Range<usize>) -> Option<&str> {
    line.get(range).map(str::trim)
}

/// Like [`field`] but tolerates a line that ends inside the range.
fn trailing_field(line: &str, range: Range<usize>) -> Option<&str> {
    let end = range.end.min(line.len());
    line.get(range.start.min(end)..end).map(str::trim)
}

/// Parses one line, or `None` if it is malformed.
pub fn parse_station_line(line: &str) -> Option<ReferenceStation> {
    let id = field(line, ID)?;
    let country = id.get(..2)?;
    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return None;
    }

    let latitude: f64 = field(line, LATITUDE)?.parse().ok()?;
    let longitude: f64 = field(line, LONGITUDE)?.parse().ok()?;
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }

    let elevation = trailing_field(line, ELEVATION)
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|e| e.is_finite() && *e > MISSING_ELEVATION);
    let name = trailing_field(line, NAME).unwrap_or_default();

    Some(ReferenceStation {
        id: id.to_string(),
        name: name.to_string(),
        country: country.to_string(),
        latitude,
        longitude,
        elevation,
    })
}

/// Parses a whole station list, dropping malformed lines and repeated IDs.
pub fn parse_station_list(text: &str) -> Vec<ReferenceStation> {
    let mut seen = HashSet::new();
    let mut stations = Vec::new();
    let mut malformed = 0;
    let mut duplicates = 0;

    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        match parse_station_line(line) {
            Some(station) if seen.insert(station.id.clone()) => stations.push(station),
            Some(_) => duplicates += 1,
            None => {
                malformed += 1;
                debug!("Dropping malformed station line: {:?}", line);
            }
        }
    }
    debug!(
        "Parsed {} stations ({} malformed lines, {} duplicate ids dropped)",
        stations.len(),
        malformed,
        duplicates
    );
    stations
}
