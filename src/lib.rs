//! Estimates how well a fleet of weather balloons covers the gaps between
//! ground-based radiosonde stations.
//!
//! The core is synchronous and works on data already in memory:
//! [`reconstruct_paths`] links hourly positions into flight paths, a
//! [`SpatialIndex`] answers "which stations are near this point", and a
//! [`CoverageAggregator`] turns both into [`CoverageStatistics`].
//! [`BalloonCoverage`] wires the core to the live hourly snapshots and the
//! reference station list.

mod analysis;
mod coverage;
mod error;
mod geo;
mod index;
mod samples;
mod stations;
mod trajectory;
mod types;
mod utils;

pub use coverage::BalloonCoverage;
pub use error::CoverageError;

pub use types::data_quality::{DataQuality, HourFetchError};
pub use types::lat_lon::LatLon;
pub use types::position::{Position, SampleRejection, LAST_HOUR};
pub use types::station::ReferenceStation;

pub use geo::distance::{distance_km, EARTH_RADIUS_KM};
pub use geo::surface::{
    is_over_ocean, BoundingBox, ContinentBoxes, Surface, SurfaceClassifier, CONTINENT_BOXES,
};

pub use index::grid::{CellSize, GridCell, KM_PER_DEGREE};
pub use index::spatial_index::{CellSpan, SpatialIndex};

pub use trajectory::flight_path::FlightPath;
pub use trajectory::reconstructor::{
    reconstruct_paths, ConsumedSet, Reconstructor, DEFAULT_MAX_HOURLY_TRAVEL_KM,
};

pub use analysis::aggregator::CoverageAggregator;
pub use analysis::config::{CoverageConfig, DEFAULT_GAP_THRESHOLD_KM};
pub use analysis::report::{build_report, CoverageReport};
pub use analysis::statistics::{percentage, AnnotatedPosition, CoverageStatistics};

pub use samples::error::SampleFetchError;
pub use samples::hourly_fetcher::{
    parse_snapshot, FetcherConfig, HourlyFetcher, HourlySnapshots, DEFAULT_BASE_URL,
};

pub use stations::error::StationLoadError;
pub use stations::station_list::{parse_station_line, parse_station_list};
pub use stations::station_loader::{StationLoader, StationSource, DEFAULT_STATION_LIST_URL};
