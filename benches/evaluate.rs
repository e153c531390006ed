use candlesig::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Deterministic pseudo-random walk, no RNG dependency.
fn make_candles(n: usize) -> Vec<Candle> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut close = 100.0;

    (0..n)
        .map(|i| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let delta = ((state >> 33) as f64 / (1u64 << 31) as f64 - 0.5) * 2.0;
            let open = close;
            close = (close + delta).max(1.0);
            let high = open.max(close) + 0.3;
            let low = open.min(close) - 0.3;
            Candle::new(i as i64 * 60, open, high, low, close)
        })
        .collect()
}

fn bench_evaluate(c: &mut Criterion) {
    let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
    let candles = make_candles(240);

    c.bench_function("evaluate_240", |b| {
        b.iter(|| engine.evaluate(black_box(&candles)).unwrap())
    });
}

fn bench_scan(c: &mut Criterion) {
    let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
    let candles = make_candles(240);

    c.bench_function("scan_grouped_240", |b| {
        b.iter(|| engine.scan_grouped(black_box(&candles)))
    });
}

fn bench_parallel(c: &mut Criterion) {
    let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
    let series: Vec<Vec<Candle>> = (0..16).map(|_| make_candles(240)).collect();
    let instruments: Vec<(&str, &[Candle])> =
        series.iter().map(|s| ("EUR/USD", s.as_slice())).collect();

    c.bench_function("evaluate_parallel_16x240", |b| {
        b.iter(|| evaluate_parallel(&engine, black_box(instruments.clone())))
    });
}

criterion_group!(benches, bench_evaluate, bench_scan, bench_parallel);
criterion_main!(benches);
