//! Turns positions, reconstructed paths and the station index into coverage
//! statistics.

use crate::analysis::statistics::{percentage, AnnotatedPosition, CoverageStatistics};
use crate::geo::surface::{ContinentBoxes, SurfaceClassifier};
use crate::index::spatial_index::SpatialIndex;
use crate::trajectory::flight_path::FlightPath;
use crate::types::data_quality::DataQuality;
use crate::types::position::Position;
use log::info;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Classifies every position as land/ocean and as gap coverage or not.
///
/// The classifier is pluggable; [`ContinentBoxes`] is the default.
#[derive(Debug, Clone)]
pub struct CoverageAggregator<C = ContinentBoxes> {
    classifier: C,
    gap_threshold_km: f64,
}

impl CoverageAggregator<ContinentBoxes> {
    pub fn new(gap_threshold_km: f64) -> Self {
        Self::with_classifier(ContinentBoxes, gap_threshold_km)
    }
}

impl<C: SurfaceClassifier> CoverageAggregator<C> {
    pub fn with_classifier(classifier: C, gap_threshold_km: f64) -> Self {
        Self {
            classifier,
            gap_threshold_km,
        }
    }

    pub fn gap_threshold_km(&self) -> f64 {
        self.gap_threshold_km
    }

    /// Annotates a single position.
    ///
    /// With no candidate stations in the searched cells the position is gap
    /// coverage straight away; otherwise it is gap coverage iff the closest
    /// candidate is farther than the threshold.
    pub fn annotate_one(&self, position: &Position, index: &SpatialIndex) -> AnnotatedPosition {
        let over_ocean = self
            .classifier
            .is_over_ocean(position.latitude, position.longitude);
        let nearest_station_km = index
            .nearest_candidate(position.lat_lon(), self.gap_threshold_km)
            .map(|(_, dist_km)| dist_km);
        let gap_coverage = match nearest_station_km {
            None => true,
            Some(dist_km) => dist_km > self.gap_threshold_km,
        };
        AnnotatedPosition {
            position: *position,
            over_ocean,
            gap_coverage,
            nearest_station_km,
        }
    }

    /// Annotates every position, in input order.
    #[cfg(not(feature = "parallel"))]
    pub fn annotate(&self, positions: &[Position], index: &SpatialIndex) -> Vec<AnnotatedPosition> {
        positions
            .iter()
            .map(|position| self.annotate_one(position, index))
            .collect()
    }

    /// Annotates every position, in input order. Positions are independent and
    /// the index is read-only, so the work is spread over the rayon pool.
    #[cfg(feature = "parallel")]
    pub fn annotate(&self, positions: &[Position], index: &SpatialIndex) -> Vec<AnnotatedPosition> {
        positions
            .par_iter()
            .map(|position| self.annotate_one(position, index))
            .collect()
    }

    pub fn analyze(
        &self,
        positions: &[Position],
        paths: &[FlightPath],
        index: &SpatialIndex,
        data_quality: DataQuality,
    ) -> CoverageStatistics {
        let annotated = self.annotate(positions, index);
        self.summarize(&annotated, paths.len(), index.len(), data_quality)
    }

    /// Builds statistics from positions that were already annotated.
    pub fn summarize(
        &self,
        annotated: &[AnnotatedPosition],
        reconstructed_paths: usize,
        total_stations: usize,
        data_quality: DataQuality,
    ) -> CoverageStatistics {
        let total = annotated.len();
        let ocean_positions = annotated.iter().filter(|a| a.over_ocean).count();
        let land_positions = total - ocean_positions;
        let unique_coverage_positions = annotated.iter().filter(|a| a.gap_coverage).count();

        info!(
            "Coverage: {} positions, {} over ocean, {} beyond {} km of any of {} stations",
            total, ocean_positions, unique_coverage_positions, self.gap_threshold_km, total_stations
        );

        CoverageStatistics {
            total_balloon_positions: total,
            reconstructed_paths,
            ocean_positions,
            land_positions,
            ocean_percentage: percentage(ocean_positions, total),
            land_percentage: percentage(land_positions, total),
            unique_coverage_positions,
            unique_coverage_percentage: percentage(unique_coverage_positions, total),
            total_stations,
            data_quality,
        }
    }
}
