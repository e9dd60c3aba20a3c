//! Grid-bucketed index over reference stations for radius queries.
//!
//! Stations are bucketed by [`GridCell`]. A radius query enumerates the square
//! of cells around the query point and returns everything in them: a superset
//! of the stations really inside the radius. Callers that need exact answers
//! filter the candidates with [`distance_km`], or use
//! [`SpatialIndex::stations_within_radius`] which does it for them.

use crate::geo::distance::distance_km;
use crate::index::grid::{CellSize, GridCell, KM_PER_DEGREE};
use crate::types::lat_lon::LatLon;
use crate::types::station::ReferenceStation;
use log::debug;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How far a radius query reaches in longitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellSpan {
    /// Same number of cells in longitude as in latitude (111 km per degree
    /// everywhere). Fine near the equator; can miss stations toward the poles.
    #[default]
    Equatorial,
    /// Widens the longitude search by `1/cos(lat)` at the farthest latitude the
    /// radius reaches, and searches every column once that gets near a pole.
    LatitudeScaled,
}

#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cells: HashMap<GridCell, Vec<ReferenceStation>>,
    cell_size: CellSize,
    span: CellSpan,
    station_count: usize,
}

impl SpatialIndex {
    /// Buckets every station into its grid cell. An empty input gives an empty
    /// index whose queries return nothing.
    pub fn build(stations: impl IntoIterator<Item = ReferenceStation>, cell_size: CellSize) -> Self {
        Self::build_with_span(stations, cell_size, CellSpan::Equatorial)
    }

    pub fn build_with_span(
        stations: impl IntoIterator<Item = ReferenceStation>,
        cell_size: CellSize,
        span: CellSpan,
    ) -> Self {
        let mut cells: HashMap<GridCell, Vec<ReferenceStation>> = HashMap::new();
        let mut station_count = 0;
        for station in stations {
            let cell = GridCell::containing(station.lat_lon(), cell_size);
            cells.entry(cell).or_default().push(station);
            station_count += 1;
        }
        debug!(
            "Indexed {} stations into {} cells of {} degrees",
            station_count,
            cells.len(),
            cell_size.degrees()
        );
        Self {
            cells,
            cell_size,
            span,
            station_count,
        }
    }

    pub fn len(&self) -> usize {
        self.station_count
    }

    pub fn is_empty(&self) -> bool {
        self.station_count == 0
    }

    /// Number of non-empty cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cell_size(&self) -> CellSize {
        self.cell_size
    }

    pub fn span(&self) -> CellSpan {
        self.span
    }

    /// Stations bucketed into one cell.
    pub fn stations_in(&self, cell: GridCell) -> &[ReferenceStation] {
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The cells a radius query around `point` looks at, each listed once.
    ///
    /// Rows are not wrapped over the poles; columns wrap at the antimeridian.
    pub fn search_cells(&self, point: LatLon, radius_km: f64) -> Vec<GridCell> {
        let center = GridCell::containing(point, self.cell_size);
        let row_radius = self.cell_size.cells_for_radius(radius_km);
        let column_radius = self.column_radius(point, radius_km, row_radius);

        let columns = self.cell_size.columns();
        let column_range: Vec<i64> = if 2 * column_radius + 1 >= columns {
            let half = columns / 2;
            (-half..columns - half).collect()
        } else {
            (-column_radius..=column_radius)
                .map(|offset| self.cell_size.wrap_column(center.column + offset))
                .collect()
        };

        let mut cells = Vec::with_capacity(((2 * row_radius + 1) as usize) * column_range.len());
        for row in (center.row - row_radius)..=(center.row + row_radius) {
            for &column in &column_range {
                cells.push(GridCell { row, column });
            }
        }
        cells
    }

    /// Every station in the cells around `point` that could lie within
    /// `radius_km`. No station inside the radius is left out (within the limits
    /// of the configured [`CellSpan`]), but some outside it are included.
    pub fn candidates_within_radius(&self, point: LatLon, radius_km: f64) -> Vec<&ReferenceStation> {
        self.search_cells(point, radius_km)
            .into_iter()
            .filter_map(|cell| self.cells.get(&cell))
            .flatten()
            .collect()
    }

    /// Candidates filtered down to those truly within `radius_km`, with their
    /// great-circle distance.
    pub fn stations_within_radius(
        &self,
        point: LatLon,
        radius_km: f64,
    ) -> Vec<(&ReferenceStation, f64)> {
        self.candidates_within_radius(point, radius_km)
            .into_iter()
            .filter_map(|station| {
                let dist_km = distance_km(point, station.lat_lon());
                (dist_km <= radius_km).then_some((station, dist_km))
            })
            .collect()
    }

    /// The closest candidate for a radius query and its distance, which may be
    /// larger than `radius_km`. `None` when the searched cells are all empty.
    pub fn nearest_candidate(
        &self,
        point: LatLon,
        radius_km: f64,
    ) -> Option<(&ReferenceStation, f64)> {
        self.candidates_within_radius(point, radius_km)
            .into_iter()
            .map(|station| (station, distance_km(point, station.lat_lon())))
            .min_by_key(|(_, dist_km)| OrderedFloat(*dist_km))
    }

    fn column_radius(&self, point: LatLon, radius_km: f64, row_radius: i64) -> i64 {
        match self.span {
            CellSpan::Equatorial => row_radius,
            CellSpan::LatitudeScaled => {
                let radius_degrees = radius_km.max(0.0) / KM_PER_DEGREE;
                let farthest_latitude = (point.0.abs() + radius_degrees).min(90.0);
                let cos = farthest_latitude.to_radians().cos();
                if cos <= 1e-6 {
                    return self.cell_size.columns();
                }
                let cells = ((radius_degrees / cos) / self.cell_size.degrees()).ceil();
                if cells.is_finite() {
                    (cells as i64).min(self.cell_size.columns())
                } else {
                    self.cell_size.columns()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    fn station(id: &str, latitude: f64, longitude: f64) -> ReferenceStation {
        ReferenceStation {
            id: id.to_string(),
            name: format!("Station {}", id),
            country: id.chars().take(2).collect(),
            latitude,
            longitude,
            elevation: None,
        }
    }

    /// One station in the middle of every 5 degree cell, then random fill.
    fn global_stations(total: usize, seed: u64) -> Vec<ReferenceStation> {
        let mut stations = Vec::with_capacity(total);
        for row in -18..18 {
            for column in -36..36 {
                let id = format!("CC{:09}", stations.len());
                stations.push(station(
                    &id,
                    row as f64 * 5.0 + 2.5,
                    column as f64 * 5.0 + 2.5,
                ));
            }
        }
        let mut rng = StdRng::seed_from_u64(seed);
        while stations.len() < total {
            let id = format!("RR{:09}", stations.len());
            stations.push(station(
                &id,
                rng.gen_range(-90.0..90.0),
                rng.gen_range(-180.0..180.0),
            ));
        }
        stations
    }

    fn brute_force(stations: &[ReferenceStation], point: LatLon, radius_km: f64) -> HashSet<String> {
        stations
            .iter()
            .filter(|s| distance_km(point, s.lat_lon()) <= radius_km)
            .map(|s| s.id.clone())
            .collect()
    }

    #[test]
    fn test_empty_index_returns_no_candidates() {
        let index = SpatialIndex::build(Vec::new(), CellSize::DEFAULT);
        assert!(index.is_empty());
        assert_eq!(index.cell_count(), 0);
        assert!(index
            .candidates_within_radius(LatLon(0.0, 0.0), 200.0)
            .is_empty());
        assert!(index.nearest_candidate(LatLon(0.0, 0.0), 200.0).is_none());
    }

    #[test]
    fn test_build_buckets_every_station_once() {
        let stations = global_stations(13_443, 1);
        let index = SpatialIndex::build(stations.clone(), CellSize::DEFAULT);
        assert_eq!(index.len(), 13_443);
        assert_eq!(index.cell_count(), 2_592);
        let bucketed: usize = (-18..18)
            .flat_map(|row| (-36..36).map(move |column| GridCell { row, column }))
            .map(|cell| index.stations_in(cell).len())
            .sum();
        assert_eq!(bucketed, stations.len());
    }

    #[test]
    fn test_equatorial_query_matches_brute_force() {
        let stations = global_stations(13_443, 2);
        let index = SpatialIndex::build(stations.clone(), CellSize::DEFAULT);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let point = LatLon(rng.gen_range(-30.0..30.0), rng.gen_range(-180.0..180.0));
            let candidates = index.candidates_within_radius(point, 200.0);
            assert!(
                candidates.len() < stations.len() / 10,
                "query scanned {} of {} stations",
                candidates.len(),
                stations.len()
            );
            let candidate_ids: HashSet<String> =
                candidates.iter().map(|s| s.id.clone()).collect();
            let truth = brute_force(&stations, point, 200.0);
            assert!(
                truth.is_subset(&candidate_ids),
                "missed {:?} near {:?}",
                truth.difference(&candidate_ids).collect::<Vec<_>>(),
                point
            );

            let exact: HashSet<String> = index
                .stations_within_radius(point, 200.0)
                .into_iter()
                .map(|(s, _)| s.id.clone())
                .collect();
            assert_eq!(exact, truth);
        }
    }

    #[test]
    fn test_latitude_scaled_query_matches_brute_force_near_poles() {
        let stations = global_stations(13_443, 4);
        let index =
            SpatialIndex::build_with_span(stations.clone(), CellSize::DEFAULT, CellSpan::LatitudeScaled);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let latitude = if rng.gen_bool(0.5) {
                rng.gen_range(60.0..90.0)
            } else {
                rng.gen_range(-90.0..-60.0)
            };
            let point = LatLon(latitude, rng.gen_range(-180.0..180.0));
            let candidate_ids: HashSet<String> = index
                .candidates_within_radius(point, 500.0)
                .iter()
                .map(|s| s.id.clone())
                .collect();
            let truth = brute_force(&stations, point, 500.0);
            assert!(truth.is_subset(&candidate_ids), "missed stations near {:?}", point);
        }
    }

    #[test]
    fn test_query_wraps_across_antimeridian() {
        let stations = vec![
            station("EAST", 0.0, 179.5),
            station("DATE", 0.0, 180.0),
            station("WEST", 0.0, -179.9),
        ];
        let index = SpatialIndex::build(stations, CellSize::DEFAULT);

        let from_west: HashSet<&str> = index
            .stations_within_radius(LatLon(0.0, -179.5), 200.0)
            .into_iter()
            .map(|(s, _)| s.id.as_str())
            .collect();
        assert_eq!(from_west, HashSet::from(["EAST", "DATE", "WEST"]));

        let from_east: HashSet<&str> = index
            .stations_within_radius(LatLon(0.0, 178.5), 200.0)
            .into_iter()
            .map(|(s, _)| s.id.as_str())
            .collect();
        assert_eq!(from_east, HashSet::from(["EAST", "DATE", "WEST"]));
    }

    #[test]
    fn test_huge_radius_returns_each_station_once() {
        let stations = global_stations(3_000, 6);
        let index = SpatialIndex::build(stations, CellSize::DEFAULT);
        let candidates = index.candidates_within_radius(LatLon(45.0, 90.0), 25_000.0);
        assert_eq!(candidates.len(), index.len());
        let unique: HashSet<&str> = candidates.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(unique.len(), index.len());
    }

    #[test]
    fn test_nearest_candidate_reports_distance() {
        let index = SpatialIndex::build(
            vec![station("NEAR", 1.0, 1.0), station("FAR", 3.0, 3.0)],
            CellSize::DEFAULT,
        );
        let (nearest, dist_km) = index.nearest_candidate(LatLon(0.0, 0.0), 200.0).unwrap();
        assert_eq!(nearest.id, "NEAR");
        assert!((dist_km - distance_km(LatLon(0.0, 0.0), LatLon(1.0, 1.0))).abs() < 1e-9);
    }
}
