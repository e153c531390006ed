//! Property tests: the engine is a pure function of its input and its
//! strength output stays inside the percent scale on arbitrary tapes.

use candlesig::prelude::*;
use proptest::prelude::*;

/// Build a valid candle series from a sequence of close-to-close deltas.
fn series(deltas: &[f64]) -> Vec<Candle> {
    let mut close = 100.0;
    deltas
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let open = close;
            close = (close + d).max(1.0);
            let high = open.max(close) + 0.2;
            let low = open.min(close) - 0.2;
            Candle::new(i as i64 * 60, open, high, low, close)
        })
        .collect()
}

fn deltas() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-2.0..2.0f64, 25..80)
}

proptest! {
    #[test]
    fn evaluation_is_deterministic(deltas in deltas()) {
        let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
        let candles = series(&deltas);

        let a = engine.evaluate(&candles).unwrap();
        let b = engine.evaluate(&candles).unwrap();
        prop_assert_eq!(a.signal, b.signal);
        prop_assert_eq!(a.frame, b.frame);
    }

    #[test]
    fn strength_stays_in_percent_scale(deltas in deltas()) {
        let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
        let eval = engine.evaluate(&series(&deltas)).unwrap();

        prop_assert!(eval.signal.strength.is_finite());
        prop_assert!((0.0..=100.0).contains(&eval.signal.strength));
    }

    #[test]
    fn discrete_strength_stays_in_percent_scale(deltas in deltas()) {
        let engine = EngineBuilder::new()
            .with_all_defaults()
            .policy(candlesig::config::ScoringPolicy::Discrete)
            .build()
            .unwrap();
        let eval = engine.evaluate(&series(&deltas)).unwrap();

        prop_assert!(eval.signal.strength.is_finite());
        prop_assert!((0.0..=100.0).contains(&eval.signal.strength));
    }

    #[test]
    fn pattern_windows_are_consistent(deltas in deltas()) {
        let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
        let candles = series(&deltas);

        for (i, group) in engine.scan_grouped(&candles).iter().enumerate() {
            for m in group {
                prop_assert_eq!(m.end_index, i);
                prop_assert!(m.start_index <= m.end_index);
            }
        }
    }
}

#[test]
fn degenerate_flat_tape_is_in_scale() {
    // zero deltas everywhere: every rolling window collapses
    let engine = EngineBuilder::new().with_all_defaults().build().unwrap();
    let candles = series(&vec![0.0; 30]);
    let eval = engine.evaluate(&candles).unwrap();

    assert!(eval.signal.strength.is_finite());
    assert!((0.0..=100.0).contains(&eval.signal.strength));
}
