use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fieldtrace::geometry::{self, Coordinate};

/// Build a roughly circular boundary with `n` vertices around a center.
fn circular_boundary(center: Coordinate, radius_deg: f64, n: usize) -> Vec<Coordinate> {
    (0..n)
        .map(|i| {
            let theta = (i as f64) / (n as f64) * std::f64::consts::TAU;
            Coordinate::new(
                center.latitude + radius_deg * theta.cos(),
                center.longitude + radius_deg * theta.sin(),
            )
        })
        .collect()
}

fn benchmark_geofence(c: &mut Criterion) {
    let center = Coordinate::new(36.6, -121.6);
    let boundary = circular_boundary(center, 0.01, 512);

    let inside = center;
    let outside = Coordinate::new(40.75, -73.98);

    let mut group = c.benchmark_group("geofence");

    group.bench_function("containment_inside", |b| {
        b.iter(|| geometry::is_point_in_polygon(black_box(inside), black_box(&boundary)))
    });

    group.bench_function("containment_outside", |b| {
        b.iter(|| geometry::is_point_in_polygon(black_box(outside), black_box(&boundary)))
    });

    group.bench_function("polygon_area", |b| {
        b.iter(|| geometry::polygon_area_square_meters(black_box(&boundary)))
    });

    group.finish();
}

criterion_group!(benches, benchmark_geofence);
criterion_main!(benches);
