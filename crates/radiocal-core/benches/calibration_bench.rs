//! # Calibration Benchmarks
//!
//! Performance benchmarks for radiocal-core calibration operations.
//!
//! Run with: `cargo bench -p radiocal-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use radiocal_core::{
    ALPHA_95, CalendarScale, CalibrationCurve, Calibrator, CurvePoint, Determination,
    calibrate_batch, combine, hpd_intervals,
};
use std::hint::black_box;
use std::sync::Arc;

/// A wiggly synthetic curve of `size` yearly records, most recent first.
fn create_curve(size: usize) -> CalibrationCurve {
    let points = (0..size)
        .rev()
        .map(|i| {
            let year = i as f64;
            CurvePoint::new(year, year + 40.0 * (year / 60.0).sin(), 15.0)
        })
        .collect();
    CalibrationCurve::from_points("bench", points).expect("curve")
}

/// Same curve stored every 5 years, to exercise resampling.
fn create_sparse_curve(size: usize) -> CalibrationCurve {
    let points = (0..size)
        .rev()
        .step_by(5)
        .map(|i| CurvePoint::new(i as f64, i as f64, 15.0))
        .collect();
    CalibrationCurve::from_points("sparse", points).expect("curve")
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_calibrate(c: &mut Criterion) {
    let mut group = c.benchmark_group("calibrate");
    let calibrator = Calibrator::new();

    for size in [1000, 10000, 50000].iter() {
        let curve = create_curve(*size);
        let det = Determination::new((*size / 2) as f64, 30.0, "bench");

        group.bench_with_input(BenchmarkId::from_parameter(size), &det, |b, det| {
            b.iter(|| black_box(calibrator.calibrate(det, &curve)));
        });
    }

    group.finish();
}

fn bench_hpd(c: &mut Criterion) {
    let mut group = c.benchmark_group("hpd_intervals");
    let calibrator = Calibrator::new();

    for sigma in [20.0, 100.0, 400.0].iter() {
        let curve = create_curve(50000);
        let det = Determination::new(25000.0, *sigma, "bench");
        let calibrated = calibrator.calibrate(&det, &curve).expect("calibrate");

        group.bench_with_input(
            BenchmarkId::new("sigma", sigma),
            &calibrated,
            |b, calibrated| {
                b.iter(|| black_box(hpd_intervals(calibrated, ALPHA_95)));
            },
        );
    }

    group.finish();
}

fn bench_resample(c: &mut Criterion) {
    let mut group = c.benchmark_group("resample");

    for size in [1000, 10000, 50000].iter() {
        let curve = create_sparse_curve(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(curve.resampled()));
        });
    }

    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("calibrate_batch");
    let curve = Arc::new(create_curve(50000));
    let calibrator = Calibrator::new();

    for count in [1, 16, 64].iter() {
        let determinations: Vec<Determination> = (0..*count)
            .map(|i| Determination::new(1000.0 + 500.0 * i as f64, 35.0, format!("S{}", i)))
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(count),
            &determinations,
            |b, dets| {
                b.iter(|| {
                    black_box(calibrate_batch(
                        &curve,
                        dets,
                        CalendarScale::Ad,
                        &calibrator,
                    ))
                });
            },
        );
    }

    group.finish();
}

fn bench_combine(c: &mut Criterion) {
    let mut group = c.benchmark_group("combine");

    for count in [2, 100, 10000].iter() {
        let determinations: Vec<Determination> = (0..*count)
            .map(|i| Determination::new(1000.0 + (i % 7) as f64, 30.0, format!("D{}", i)))
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(count),
            &determinations,
            |b, dets| {
                b.iter(|| black_box(combine(dets)));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_calibrate,
    bench_hpd,
    bench_resample,
    bench_batch,
    bench_combine
);
criterion_main!(benches);
