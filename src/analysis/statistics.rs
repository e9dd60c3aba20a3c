use crate::types::data_quality::DataQuality;
use crate::types::position::Position;
use serde::Serialize;

/// A position together with what the coverage analysis found out about it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedPosition {
    #[serde(flatten)]
    pub position: Position,
    pub over_ocean: bool,
    /// Farther than the gap threshold from every reference station.
    pub gap_coverage: bool,
    /// Distance to the closest station the index offered, if it offered any.
    pub nearest_station_km: Option<f64>,
}

/// Summary of one coverage analysis run.
///
/// Field names serialize in camelCase (`totalBalloonPositions`,
/// `uniqueCoveragePercentage`, ...). Percentages are rounded to one decimal
/// and are `0.0` when there are no positions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageStatistics {
    pub total_balloon_positions: usize,
    pub reconstructed_paths: usize,
    pub ocean_positions: usize,
    pub land_positions: usize,
    pub ocean_percentage: f64,
    pub land_percentage: f64,
    pub unique_coverage_positions: usize,
    pub unique_coverage_percentage: f64,
    pub total_stations: usize,
    pub data_quality: DataQuality,
}

/// `part / total` as a percentage with one decimal, `0.0` for an empty total.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(5, 0), 0.0);
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 3), 66.7);
        assert_eq!(percentage(7, 7), 100.0);
    }
}
