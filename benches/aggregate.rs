use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geo::{polygon, MultiPolygon};
use heatspot::{aggregate, BrightnessBounds, Observation, Region, RegionSet};

/// 10 x 10 grid of one degree cells roughly covering Thailand.
fn provinces() -> RegionSet {
    let mut regions = Vec::new();
    for row in 0..10 {
        for column in 0..10 {
            let x = 97.0 + column as f64;
            let y = 5.0 + row as f64 * 1.5;
            regions.push(Region::new(
                format!("cell-{}-{}", row, column),
                MultiPolygon(vec![polygon![
                    (x: x, y: y),
                    (x: x + 1.0, y: y),
                    (x: x + 1.0, y: y + 1.5),
                    (x: x, y: y + 1.5),
                    (x: x, y: y),
                ]]),
            ));
        }
    }
    RegionSet::new(regions)
}

fn hotspots(n: usize) -> Vec<Observation> {
    let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
    (0..n)
        .map(|i| {
            let t = i as f64 / n as f64;
            Observation::new(
                5.0 + (t * 7919.0).fract() * 15.0,
                97.0 + (t * 104_729.0).fract() * 10.0,
                250.0 + (t * 1_299_709.0).fract() * 150.0,
                date,
            )
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let regions = provinces();
    let observations = hotspots(10_000);
    let bounds = BrightnessBounds::default();

    c.bench_function("aggregate_10k", |b| {
        b.iter(|| aggregate(black_box(&observations), black_box(&regions)))
    });
    c.bench_function("heat_points_10k", |b| {
        b.iter(|| bounds.heat_points(black_box(&observations)))
    });
}

criterion_group!(benches, bench_aggregate);
criterion_main!(benches);
