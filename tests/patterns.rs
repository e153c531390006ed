//! Integration tests for pattern detection through the public engine API.

use candlesig::prelude::*;

fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
    Candle::new(0, open, high, low, close)
}

/// Filler candle with a modest body that avoids the single-candle shapes.
fn filler(level: f64) -> Candle {
    candle(level, level + 1.0, level - 1.0, level + 0.5)
}

fn engine() -> SignalEngine {
    EngineBuilder::new().with_all_defaults().build().unwrap()
}

fn labels_at(engine: &SignalEngine, candles: &[Candle], index: usize) -> Vec<&'static str> {
    engine
        .scan_at(candles, index)
        .iter()
        .map(|m| m.label())
        .collect()
}

#[test]
fn marubozu_fixture() {
    let candles = vec![filler(100.0), candle(100.0, 110.5, 99.8, 110.0)];
    let labels = labels_at(&engine(), &candles, 1);
    assert!(labels.contains(&"Bullish Marubozu"), "got {labels:?}");
}

#[test]
fn hammer_vs_shooting_star() {
    let eng = engine();

    let hammer = vec![filler(100.0), candle(100.0, 101.2, 95.0, 101.0)];
    let labels = labels_at(&eng, &hammer, 1);
    assert!(labels.contains(&"Hammer"), "got {labels:?}");
    assert!(!labels.contains(&"Shooting Star"));

    let star = vec![filler(100.0), candle(101.0, 106.0, 99.8, 100.0)];
    let labels = labels_at(&eng, &star, 1);
    assert!(labels.contains(&"Shooting Star"), "got {labels:?}");
    assert!(!labels.contains(&"Hammer"));
}

#[test]
fn bullish_engulfing_fixture() {
    // prior bearish 100 -> 98, current bullish 97 -> 102
    let candles = vec![
        candle(100.0, 100.5, 97.5, 98.0),
        candle(97.0, 102.5, 96.5, 102.0),
    ];
    let matches = engine().scan_at(&candles, 1);
    let engulfing = matches
        .iter()
        .find(|m| m.pattern_id.as_str() == "ENGULFING")
        .expect("engulfing should match");
    assert_eq!(engulfing.direction, Direction::Bullish);
    assert_eq!(engulfing.label(), "Bullish Engulfing");
    assert_eq!(engulfing.start_index, 0);
    assert_eq!(engulfing.end_index, 1);
}

#[test]
fn rising_wedge_needs_the_full_window() {
    // lows rising faster than highs over five candles
    let candles: Vec<Candle> = (0..5)
        .map(|i| {
            let high = 105.0 + i as f64 * 0.5;
            let low = 95.0 + i as f64;
            candle((high + low) / 2.0, high, low, (high + low) / 2.0 + 0.01)
        })
        .collect();

    let eng = EngineBuilder::new().with_shape_defaults().build().unwrap();
    for index in 0..4 {
        assert!(
            eng.scan_at(&candles, index).is_empty(),
            "window not filled at {index}"
        );
    }
    let matches = eng.scan_at(&candles, 4);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].label(), "Rising Wedge");
    assert_eq!(matches[0].direction, Direction::Bearish);
}

#[test]
fn doji_is_neutral() {
    let candles = vec![filler(100.0), candle(100.0, 101.0, 99.0, 100.05)];
    let matches = engine().scan_at(&candles, 1);
    let doji = matches
        .iter()
        .find(|m| m.pattern_id.as_str() == "DOJI")
        .expect("doji should match");
    assert_eq!(doji.direction, Direction::Neutral);
}

#[test]
fn scan_grouped_aligns_with_scan_at() {
    let eng = engine();
    let candles: Vec<Candle> = (0..30)
        .map(|i| {
            let base = 100.0 + (i as f64 * 0.8).sin() * 2.0;
            Candle::new(i * 60, base, base + 1.2, base - 1.2, base + 0.6)
        })
        .collect();

    let grouped = eng.scan_grouped(&candles);
    assert_eq!(grouped.len(), candles.len());
    for (i, group) in grouped.iter().enumerate() {
        let direct = eng.scan_at(&candles, i);
        assert_eq!(group.len(), direct.len(), "mismatch at candle {i}");
    }
}

#[test]
fn detectors_never_look_forward() {
    // appending candles must not change matches at earlier indexes
    let eng = engine();
    let mut candles: Vec<Candle> = (0..20)
        .map(|i| {
            let base = 100.0 + (i as f64 * 1.3).cos() * 3.0;
            Candle::new(i * 60, base, base + 1.5, base - 1.5, base + 0.7)
        })
        .collect();

    let before: Vec<usize> = (0..candles.len())
        .map(|i| eng.scan_at(&candles, i).len())
        .collect();

    candles.push(candle(200.0, 260.0, 150.0, 250.0));
    for (i, count) in before.iter().enumerate() {
        assert_eq!(eng.scan_at(&candles, i).len(), *count, "index {i} changed");
    }
}
