//! Greedy reconstruction of balloon paths from anonymous hourly positions.
//!
//! Every position at the earliest available hour seeds a path. Each seed then
//! walks forward hour by hour and claims the nearest unclaimed position of that
//! hour, provided it lies closer than the travel bound. When nothing is close
//! enough the path keeps its last position as anchor and tries the next hour.
//! Equal distances go to the position that arrived first within its hour.
//!
//! This is a heuristic, not identity tracking: two balloons crossing paths can
//! swap, and seeds walked first get first pick.

use crate::geo::distance::distance_km;
use crate::trajectory::flight_path::FlightPath;
use crate::types::position::{Position, LAST_HOUR};
use log::{debug, trace};
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;
use std::ops::Bound;

/// Largest distance, in kilometers, a balloon is assumed to cover between two
/// consecutive snapshots.
pub const DEFAULT_MAX_HOURLY_TRAVEL_KM: f64 = 500.0;

/// Positions grouped per hour, each hour keeping the order samples arrived in.
type HourBuckets = BTreeMap<u8, Vec<Position>>;

fn bucket_by_hour(positions: &[Position]) -> HourBuckets {
    let mut buckets = HourBuckets::new();
    for position in positions {
        buckets.entry(position.hour).or_default().push(*position);
    }
    buckets
}

/// Which positions have been claimed by a path, addressed by hour and by index
/// within that hour's bucket.
///
/// Passed by value through every seed walk, so the order in which positions
/// were claimed is explicit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumedSet {
    taken: BTreeMap<u8, Vec<bool>>,
    count: usize,
}

impl ConsumedSet {
    fn for_buckets(buckets: &HourBuckets) -> Self {
        Self {
            taken: buckets
                .iter()
                .map(|(&hour, bucket)| (hour, vec![false; bucket.len()]))
                .collect(),
            count: 0,
        }
    }

    pub fn contains(&self, hour: u8, index: usize) -> bool {
        self.taken
            .get(&hour)
            .and_then(|slots| slots.get(index))
            .copied()
            .unwrap_or(false)
    }

    /// Marks a position as claimed. Returns `false` if it already was.
    fn insert(&mut self, hour: u8, index: usize) -> bool {
        match self.taken.get_mut(&hour).and_then(|slots| slots.get_mut(index)) {
            Some(slot) if !*slot => {
                *slot = true;
                self.count += 1;
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reconstructor {
    max_hourly_travel_km: f64,
}

impl Default for Reconstructor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HOURLY_TRAVEL_KM)
    }
}

impl Reconstructor {
    pub fn new(max_hourly_travel_km: f64) -> Self {
        Self {
            max_hourly_travel_km,
        }
    }

    pub fn max_hourly_travel_km(&self) -> f64 {
        self.max_hourly_travel_km
    }

    pub fn reconstruct(&self, positions: &[Position]) -> Vec<FlightPath> {
        self.reconstruct_with_consumed(positions).0
    }

    /// Like [`Reconstructor::reconstruct`], also returning which positions
    /// ended up in a path.
    pub fn reconstruct_with_consumed(&self, positions: &[Position]) -> (Vec<FlightPath>, ConsumedSet) {
        let buckets = bucket_by_hour(positions);
        let mut consumed = ConsumedSet::for_buckets(&buckets);

        let Some((&seed_hour, seeds)) = buckets.first_key_value() else {
            return (Vec::new(), consumed);
        };

        let mut paths = Vec::with_capacity(seeds.len());
        for (index, seed) in seeds.iter().enumerate() {
            consumed.insert(seed_hour, index);
            let (path, after_walk) = self.walk(*seed, &buckets, consumed);
            consumed = after_walk;
            paths.push(path);
        }

        debug!(
            "Reconstructed {} paths from {} positions (seed hour {}, {} linked)",
            paths.len(),
            positions.len(),
            seed_hour,
            consumed.len()
        );
        (paths, consumed)
    }

    fn walk(
        &self,
        seed: Position,
        buckets: &HourBuckets,
        mut consumed: ConsumedSet,
    ) -> (FlightPath, ConsumedSet) {
        let mut path = FlightPath::from_seed(seed);
        let later_hours = buckets.range((Bound::Excluded(seed.hour), Bound::Included(LAST_HOUR)));

        for (&hour, bucket) in later_hours {
            let anchor = path.last().lat_lon();
            let nearest = bucket
                .iter()
                .enumerate()
                .filter(|(index, _)| !consumed.contains(hour, *index))
                .map(|(index, candidate)| (index, distance_km(anchor, candidate.lat_lon())))
                .min_by_key(|&(index, dist_km)| (OrderedFloat(dist_km), index));

            match nearest {
                Some((index, dist_km)) if dist_km < self.max_hourly_travel_km => {
                    consumed.insert(hour, index);
                    path.push(bucket[index]);
                }
                Some((_, dist_km)) => {
                    trace!("Hour {}: nearest candidate {:.1} km away, path not extended", hour, dist_km);
                }
                None => {
                    trace!("Hour {}: no unclaimed candidates left", hour);
                }
            }
        }
        (path, consumed)
    }
}

/// Reconstructs paths with the given hourly travel bound.
pub fn reconstruct_paths(positions: &[Position], max_hourly_travel_km: f64) -> Vec<FlightPath> {
    Reconstructor::new(max_hourly_travel_km).reconstruct(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::distance::EARTH_RADIUS_KM;
    use chrono::{TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    fn at(latitude: f64, longitude: f64, hour: u8) -> Position {
        let fetched_at = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        Position::new(latitude, longitude, 15.0, hour, fetched_at).unwrap()
    }

    /// Longitude offset along the equator that corresponds to `km`.
    fn equator_degrees(km: f64) -> f64 {
        (km / EARTH_RADIUS_KM).to_degrees()
    }

    #[test]
    fn test_empty_pool_gives_no_paths() {
        let (paths, consumed) = Reconstructor::default().reconstruct_with_consumed(&[]);
        assert!(paths.is_empty());
        assert!(consumed.is_empty());
    }

    #[test]
    fn test_links_nearby_and_ignores_far_sample() {
        let start = at(0.0, 0.0, 0);
        let near = at(0.0, equator_degrees(100.0), 1);
        let far = at(0.0, -equator_degrees(1000.0), 1);
        let paths = reconstruct_paths(&[start, far, near], DEFAULT_MAX_HOURLY_TRAVEL_KM);

        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].positions(), &[start, near]);
        assert!((paths[0].length_km() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_seeds_from_earliest_available_hour() {
        let pool = [at(10.0, 10.0, 3), at(-10.0, 50.0, 2), at(-10.5, 50.5, 3)];
        let paths = Reconstructor::default().reconstruct(&pool);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].hours().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(paths[0].first(), &pool[1]);
        assert_eq!(paths[0].last(), &pool[2]);
    }

    #[test]
    fn test_gap_keeps_last_anchor() {
        let start = at(0.0, 0.0, 0);
        let unrelated = at(40.0, 40.0, 1);
        let resumed = at(0.0, equator_degrees(300.0), 2);
        let paths = Reconstructor::default().reconstruct(&[start, unrelated, resumed]);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].positions(), &[start, resumed]);
    }

    #[test]
    fn test_travel_bound_is_exclusive_of_far_candidates() {
        let start = at(0.0, 0.0, 0);
        let too_far = at(0.0, equator_degrees(600.0), 1);
        let paths = Reconstructor::new(500.0).reconstruct(&[start, too_far]);
        assert_eq!(paths[0].len(), 1);

        let paths = Reconstructor::new(700.0).reconstruct(&[start, too_far]);
        assert_eq!(paths[0].len(), 2);
    }

    #[test]
    fn test_earlier_seed_claims_shared_candidate() {
        let first_seed = at(0.0, 0.0, 0);
        let second_seed = at(0.0, 2.0, 0);
        let contested = at(0.0, 1.9, 1);
        let (paths, consumed) =
            Reconstructor::default().reconstruct_with_consumed(&[first_seed, second_seed, contested]);

        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].positions(), &[first_seed, contested]);
        assert_eq!(paths[1].positions(), &[second_seed]);
        assert_eq!(consumed.len(), 3);
        assert!(consumed.contains(1, 0));
    }

    #[test]
    fn test_equal_distances_go_to_first_arrival() {
        let start = at(0.0, 0.0, 0);
        let east = at(0.0, 1.0, 1);
        let west = at(0.0, -1.0, 1);

        let paths = Reconstructor::default().reconstruct(&[start, east, west]);
        assert_eq!(paths[0].positions(), &[start, east]);

        let paths = Reconstructor::default().reconstruct(&[start, west, east]);
        assert_eq!(paths[0].positions(), &[start, west]);
    }

    #[test]
    fn test_random_pool_never_shares_positions() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut pool = Vec::new();
        for hour in 0..=LAST_HOUR {
            if hour == 5 {
                continue; // a failed fetch
            }
            for _ in 0..rng.gen_range(40..80) {
                pool.push(at(rng.gen_range(-20.0..20.0), rng.gen_range(-20.0..20.0), hour));
            }
        }

        let (paths, consumed) = Reconstructor::default().reconstruct_with_consumed(&pool);
        let seeds = pool.iter().filter(|p| p.hour == 0).count();
        assert_eq!(paths.len(), seeds);

        let mut seen = HashSet::new();
        let mut linked = 0;
        for path in &paths {
            let hours: Vec<u8> = path.hours().collect();
            assert!(hours.windows(2).all(|w| w[0] < w[1]), "hours not ascending: {:?}", hours);
            assert!(!hours.contains(&5));
            for position in path.positions() {
                let key = (position.hour, position.latitude.to_bits(), position.longitude.to_bits());
                assert!(seen.insert(key), "position {:?} used twice", position);
                linked += 1;
            }
            for leg in path.positions().windows(2) {
                assert!(distance_km(leg[0].lat_lon(), leg[1].lat_lon()) < DEFAULT_MAX_HOURLY_TRAVEL_KM);
            }
        }
        assert_eq!(linked, consumed.len());
        assert!(linked <= pool.len());
    }
}
