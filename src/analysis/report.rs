use crate::analysis::aggregator::CoverageAggregator;
use crate::analysis::config::CoverageConfig;
use crate::analysis::statistics::{AnnotatedPosition, CoverageStatistics};
use crate::index::spatial_index::SpatialIndex;
use crate::samples::hourly_fetcher::HourlySnapshots;
use crate::trajectory::flight_path::FlightPath;
use crate::trajectory::reconstructor::Reconstructor;
use crate::types::station::ReferenceStation;
use log::info;
use serde::Serialize;
use std::time::Instant;

/// Everything one analysis run hands to the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub statistics: CoverageStatistics,
    pub paths: Vec<FlightPath>,
    pub positions: Vec<AnnotatedPosition>,
}

/// Runs the whole core pipeline over data already in memory: reconstruct paths,
/// build the station index once, then annotate and summarize every position.
pub fn build_report(
    config: &CoverageConfig,
    snapshots: &HourlySnapshots,
    stations: Vec<ReferenceStation>,
) -> CoverageReport {
    let start = Instant::now();
    let positions = snapshots.positions();

    let paths = Reconstructor::new(config.max_hourly_travel_km).reconstruct(&positions);
    let index = SpatialIndex::build_with_span(stations, config.cell_size, config.cell_span);

    let aggregator = CoverageAggregator::new(config.gap_threshold_km);
    let annotated = aggregator.annotate(&positions, &index);
    let statistics =
        aggregator.summarize(&annotated, paths.len(), index.len(), snapshots.data_quality());

    info!(
        "Built coverage report ({} positions, {} paths, {} stations) in {:?}",
        statistics.total_balloon_positions,
        statistics.reconstructed_paths,
        statistics.total_stations,
        start.elapsed()
    );
    CoverageReport {
        statistics,
        paths,
        positions: annotated,
    }
}
