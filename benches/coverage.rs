use balloon_coverage::{
    distance_km, reconstruct_paths, CellSize, CoverageAggregator, Position, ReferenceStation,
    SpatialIndex, DEFAULT_GAP_THRESHOLD_KM, DEFAULT_MAX_HOURLY_TRAVEL_KM,
};
use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_stations(rng: &mut StdRng, count: usize) -> Vec<ReferenceStation> {
    (0..count)
        .map(|i| ReferenceStation {
            id: format!("XXM{:08}", i),
            name: format!("STATION {}", i),
            country: "XX".to_string(),
            latitude: rng.gen_range(-80.0..80.0),
            longitude: rng.gen_range(-180.0..180.0),
            elevation: None,
        })
        .collect()
}

fn random_positions(rng: &mut StdRng, per_hour: usize) -> Vec<Position> {
    let now = Utc::now();
    (0..24u8)
        .flat_map(|hour| (0..per_hour).map(move |_| hour))
        .filter_map(|hour| {
            Position::new(
                rng.gen_range(-80.0..80.0),
                rng.gen_range(-180.0..180.0),
                rng.gen_range(0.0..25.0),
                hour,
                now,
            )
            .ok()
        })
        .collect()
}

fn brute_force_gaps(positions: &[Position], stations: &[ReferenceStation]) -> usize {
    positions
        .iter()
        .filter(|p| {
            stations
                .iter()
                .map(|s| distance_km(p.lat_lon(), s.lat_lon()))
                .fold(f64::INFINITY, f64::min)
                > DEFAULT_GAP_THRESHOLD_KM
        })
        .count()
}

fn bench_coverage(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let stations = random_stations(&mut rng, 1_500);
    let positions = random_positions(&mut rng, 400);
    let index = SpatialIndex::build(stations.clone(), CellSize::default());
    let aggregator = CoverageAggregator::new(DEFAULT_GAP_THRESHOLD_KM);

    c.bench_function("annotate_grid_index", |b| {
        b.iter(|| aggregator.annotate(black_box(&positions), black_box(&index)))
    });
    c.bench_function("gaps_brute_force", |b| {
        b.iter(|| brute_force_gaps(black_box(&positions), black_box(&stations)))
    });
    c.bench_function("reconstruct_paths", |b| {
        b.iter(|| reconstruct_paths(black_box(&positions), DEFAULT_MAX_HOURLY_TRAVEL_KM))
    });
}

criterion_group!(benches, bench_coverage);
criterion_main!(benches);
